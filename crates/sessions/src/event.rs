use std::borrow::Cow;

use {
    chrono::{SecondsFormat, Utc},
    once_cell::sync::Lazy,
    regex::Regex,
    serde::{Deserialize, Serialize},
};

#[allow(clippy::unwrap_used)]
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Remove anything that looks like a `<...>` tag. Not an HTML sanitizer: it
/// only keeps the text between tags.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(text, "")
}

/// Current time as RFC 3339 UTC with millisecond precision (`…T…:…:….123Z`).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One chat turn as it is stored in a buffer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub role: String,
    pub content: String,
    #[serde(rename = "ts")]
    pub timestamp: String,
}

impl MessageEvent {
    /// Serialize as a single newline-terminated NDJSON record.
    pub fn to_record(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
