//! Human-readable transcript rendering for merged buffer contents.

use std::borrow::Cow;

use serde_json::Value;

use crate::event::{now_timestamp, strip_tags};

/// Display name for a stored role.
pub fn role_label(role: Option<&str>) -> &'static str {
    match role {
        Some("assistant") => "GPT",
        Some("vote") => "Vote",
        _ => "User",
    }
}

/// Render one NDJSON line as `[<ts>] <Label>: <content>`.
///
/// Lines that are not a JSON object, or whose `content` is neither a string
/// nor absent, come back unchanged.
pub fn render_line(line: &str) -> Cow<'_, str> {
    let Ok(Value::Object(record)) = serde_json::from_str::<Value>(line) else {
        return Cow::Borrowed(line);
    };

    let content = match record.get("content") {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Cow::Borrowed(line),
    };
    let label = role_label(record.get("role").and_then(Value::as_str));
    let ts = record
        .get("ts")
        .and_then(timestamp_text)
        .unwrap_or_else(now_timestamp);

    Cow::Owned(format!("[{ts}] {label}: {}", strip_tags(content)))
}

/// Text for a stored `ts`. Empty strings, zero, `false`, `null` and
/// structured values count as missing.
fn timestamp_text(ts: &Value) -> Option<String> {
    match ts {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}

/// Render every non-empty line of `combined`.
pub fn render_lines(combined: &str) -> Vec<String> {
    combined
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| render_line(line).into_owned())
        .collect()
}

/// Export body: rendered lines joined by `\n` with a trailing newline.
pub fn export_body(lines: &[String]) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(Some("assistant"), "GPT")]
    #[case(Some("vote"), "Vote")]
    #[case(Some("user"), "User")]
    #[case(Some("system"), "User")]
    #[case(Some("Assistant"), "User")]
    #[case(None, "User")]
    fn maps_roles_to_labels(#[case] role: Option<&str>, #[case] label: &str) {
        assert_eq!(role_label(role), label);
    }

    #[test]
    fn renders_event_line() {
        let line = r#"{"role":"assistant","content":"<i>hi</i> there","ts":"2024-01-01T00:00:00.000Z"}"#;
        assert_eq!(
            render_line(line),
            "[2024-01-01T00:00:00.000Z] GPT: hi there"
        );
    }

    #[rstest]
    #[case("not json at all")]
    #[case("{\"role\":\"user\",")]
    #[case("42")]
    #[case("\"just a string\"")]
    #[case("null")]
    #[case("[1,2,3]")]
    #[case(r#"{"role":"user","content":17,"ts":"x"}"#)]
    fn passes_through_non_events_verbatim(#[case] line: &str) {
        assert_eq!(render_line(line), line);
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let rendered = render_line(r#"{"role":"vote","content":"A"}"#);
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with("] Vote: A"));
        let ts = &rendered[1..rendered.find(']').unwrap()];
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());

        let rendered = render_line(r#"{"role":"vote","content":"A","ts":""}"#);
        assert!(!rendered.starts_with("[]"));
    }

    #[rstest]
    #[case(r#"{"role":"user","content":"x","ts":1700000000}"#, "[1700000000] User: x")]
    #[case(r#"{"role":"user","content":"x","ts":1.5}"#, "[1.5] User: x")]
    #[case(r#"{"role":"user","content":"x","ts":true}"#, "[true] User: x")]
    fn non_string_timestamp_keeps_its_text(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(render_line(line), expected);
    }

    #[rstest]
    #[case(r#"{"role":"user","content":"x","ts":0}"#)]
    #[case(r#"{"role":"user","content":"x","ts":false}"#)]
    #[case(r#"{"role":"user","content":"x","ts":null}"#)]
    fn falsy_timestamp_defaults_to_now(#[case] line: &str) {
        let rendered = render_line(line);
        let ts = &rendered[1..rendered.find(']').unwrap()];
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn missing_content_renders_empty() {
        assert_eq!(
            render_line(r#"{"role":"user","ts":"t"}"#),
            "[t] User: "
        );
        assert_eq!(
            render_line(r#"{"role":"user","content":null,"ts":"t"}"#),
            "[t] User: "
        );
    }

    #[test]
    fn render_lines_skips_blank_lines() {
        let combined = "{\"role\":\"user\",\"content\":\"a\",\"ts\":\"1\"}\n\n\ngarbage\n";
        assert_eq!(render_lines(combined), vec!["[1] User: a", "garbage"]);
    }

    #[test]
    fn export_body_has_trailing_newline() {
        assert_eq!(export_body(&["a".into(), "b".into()]), "a\nb\n");
        assert_eq!(export_body(&[]), "\n");
    }
}
