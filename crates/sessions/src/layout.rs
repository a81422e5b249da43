use crate::key::SessionId;

/// Default top-level folder for every object this crate writes.
pub const DEFAULT_ROOT: &str = "chat-exports";

const BUFFER_DIR: &str = "buffer";
const EXPORTS_DIR: &str = "exports";

/// Key scheme for buffer and export objects under a common root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: String,
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
        }
    }
}

impl StorageLayout {
    pub fn new(root: &str) -> Self {
        let root = root.trim_matches('/');
        if root.is_empty() {
            return Self::default();
        }
        Self {
            root: root.to_string(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// `<root>/buffer/`
    pub fn buffer_root(&self) -> String {
        format!("{}/{BUFFER_DIR}/", self.root)
    }

    /// `<root>/buffer/<session>/`
    pub fn buffer_prefix(&self, session: &SessionId) -> String {
        format!("{}{session}/", self.buffer_root())
    }

    pub fn buffer_key(&self, session: &SessionId, epoch_millis: i64, suffix: &str) -> String {
        format!(
            "{}{epoch_millis}-{suffix}.ndjson",
            self.buffer_prefix(session)
        )
    }

    pub fn export_key(&self, session: &SessionId, epoch_millis: i64) -> String {
        format!("{}/{EXPORTS_DIR}/{session}/{epoch_millis}.txt", self.root)
    }

    /// Session segment of a buffer object path, if `path` is one.
    pub fn session_of(&self, path: &str) -> Option<SessionId> {
        let rest = path.strip_prefix(&self.buffer_root())?;
        let (session, name) = rest.split_once('/')?;
        if session.is_empty() || name.is_empty() {
            return None;
        }
        Some(SessionId::sanitize(session))
    }
}
