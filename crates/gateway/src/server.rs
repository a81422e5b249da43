use std::{net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{
        Router,
        routing::{get, post},
    },
    chatlog_config::ChatlogConfig,
    chatlog_sessions::StorageLayout,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{info, warn},
};

use crate::{
    routes::{buffer_handler, flush_handler, health_handler},
    state::GatewayState,
    storage::open_store,
    sweeper::spawn_sweeper,
};

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/log/buffer", post(buffer_handler))
        .route("/log/flush", post(flush_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the gateway HTTP server with the given config.
pub async fn start_gateway(config: &ChatlogConfig) -> anyhow::Result<()> {
    let store = open_store(&config.storage)?;
    let layout = StorageLayout::new(&config.storage.root);
    let state = GatewayState::new(store, layout.clone());

    let app = build_gateway_app(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Startup banner.
    let sweep = if config.flush.enabled() {
        format!("every {}s", config.flush.interval_secs)
    } else {
        "off".to_string()
    };
    let lines = [
        format!("chatlog gateway v{}", state.version),
        format!("listening on {addr}"),
        format!("storage: {} (root {})", state.backend, layout.root()),
        format!("auto-flush: {sweep}"),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    let sweeper = config
        .flush
        .enabled()
        .then(|| spawn_sweeper(Arc::clone(&state), Duration::from_secs(config.flush.interval_secs)));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
