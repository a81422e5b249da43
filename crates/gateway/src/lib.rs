//! Gateway: HTTP front end for chat-log buffering and flushing.
//!
//! Lifecycle:
//! 1. Load config, open the blob store
//! 2. Build shared state (buffer writer + flush merger)
//! 3. Start the HTTP server (`/health`, `/log/buffer`, `/log/flush`)
//! 4. Optionally start the periodic sweeper
//!
//! All buffering/export logic lives in `chatlog-sessions`; handlers only
//! decode requests and map results to HTTP.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod storage;
pub mod sweeper;
