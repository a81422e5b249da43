/// Expand `${VAR}` and `${VAR:-fallback}` placeholders in raw config text.
///
/// An unset variable without a fallback is left in place untouched, so the
/// parse error (if any) points at the placeholder.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder literally.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "CHATLOG_PORT" => Some("9000".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[rstest]
    #[case("port = ${CHATLOG_PORT}", "port = 9000")]
    #[case("port = ${MISSING:-8787}", "port = 8787")]
    #[case("port = ${CHATLOG_PORT:-1}", "port = 9000")]
    #[case("x = '${EMPTY}'", "x = ''")]
    #[case("keep ${MISSING} as-is", "keep ${MISSING} as-is")]
    #[case("${}", "${}")]
    #[case("broken ${OPEN", "broken ${OPEN")]
    #[case("plain text", "plain text")]
    #[case("$CHATLOG_PORT", "$CHATLOG_PORT")]
    fn expands_placeholders(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_with(input, fake_env), expected);
    }

    #[test]
    #[allow(unsafe_code)]
    fn reads_process_environment() {
        unsafe { std::env::set_var("CHATLOG_TEST_SUBST", "hello") };
        assert_eq!(substitute_env("v=${CHATLOG_TEST_SUBST}"), "v=hello");
        unsafe { std::env::remove_var("CHATLOG_TEST_SUBST") };
    }
}
