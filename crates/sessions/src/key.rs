use std::fmt;

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION: &str = "anon";

/// Storage-safe session identifier: only `[A-Za-z0-9_-]`.
///
/// Callers pick session names freely; anything outside the allow-list is
/// replaced with `-` so the id can be used as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn sanitize(raw: &str) -> Self {
        if raw.is_empty() {
            return Self(DEFAULT_SESSION.to_string());
        }
        Self(
            raw.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                        c
                    } else {
                        '-'
                    }
                })
                .collect(),
        )
    }

    /// Sanitize `raw`, falling back to [`DEFAULT_SESSION`] when absent.
    pub fn from_optional(raw: Option<&str>) -> Self {
        Self::sanitize(raw.unwrap_or(DEFAULT_SESSION))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self(DEFAULT_SESSION.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
