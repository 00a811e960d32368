use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ASSIGNMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"publish_page\s*=\s*\{").unwrap());

// Used when the brace scan cannot balance the literal.
static TERMINATED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\{.*?\})\s*;").unwrap());

/// Text of the first `<script>` that assigns `publish_page = {...}`.
pub fn assignment_script(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    document
        .select(&selector)
        .map(|script| script.text().collect::<String>())
        .find(|text| ASSIGNMENT_REGEX.is_match(text))
}

/// Everything from the opening `{` of the assignment to the end of the
/// script. The literal inside still needs repairing before it can be cut.
pub fn assignment_tail(script: &str) -> Option<&str> {
    let assignment = ASSIGNMENT_REGEX.find(script)?;
    Some(&script[assignment.end() - 1..])
}

/// The `{...}` literal at the start of `tail`, without the terminator.
pub fn object_literal(tail: &str) -> Option<&str> {
    if let Some(len) = balanced_object_len(tail) {
        return Some(&tail[..len]);
    }

    TERMINATED_REGEX
        .captures(tail)
        .and_then(|captures| captures.get(1))
        .map(|literal| literal.as_str())
}

/// Length of the JSON-ish object at the start of `text`, honouring double
/// quoted strings and backslash escapes. `None` when it never closes.
fn balanced_object_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, byte) in text.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + 1);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal_of(script: &str) -> Option<&str> {
        assignment_tail(script).and_then(object_literal)
    }

    #[test]
    fn test_object_literal_stops_at_matching_brace() {
        let script = r#"var a = 1; publish_page = {"x": {"y": "};"}, "z": [1]}; var b = {};"#;

        assert_eq!(
            literal_of(script),
            Some(r#"{"x": {"y": "};"}, "z": [1]}"#)
        );
    }

    #[test]
    fn test_object_literal_handles_escaped_quotes() {
        let script = r#"publish_page={"t":"a\"}b"};"#;

        assert_eq!(literal_of(script), Some(r#"{"t":"a\"}b"}"#));
    }

    #[test]
    fn test_unbalanced_literal_falls_back_to_terminator() {
        let script = r#"publish_page = {"t": "unterminated}; more text"#;

        assert_eq!(literal_of(script), Some(r#"{"t": "unterminated}"#));
    }

    #[test]
    fn test_no_assignment() {
        assert_eq!(assignment_tail("var publish_list = [];"), None);
    }

    #[test]
    fn test_tail_runs_to_end_of_script() {
        let script = r#"var t = 1; publish_page = {"a": 1}; var u = 2;"#;

        assert_eq!(
            assignment_tail(script),
            Some(r#"{"a": 1}; var u = 2;"#)
        );
    }

    #[test]
    fn test_assignment_script_picks_matching_script() {
        let html = r#"<html><head>
            <script>window.cgiData = {"a": 1};</script>
            <script>
              var token = "abc";
              publish_page = {"total_count": 2, "publish_list": []};
            </script>
        </head><body></body></html>"#;

        let script = assignment_script(html).unwrap();
        assert_eq!(
            literal_of(&script),
            Some(r#"{"total_count": 2, "publish_list": []}"#)
        );
    }

    #[test]
    fn test_assignment_outside_script_is_ignored() {
        let html = r#"<html><body><p>publish_page = {"a": 1};</p></body></html>"#;

        assert_eq!(assignment_script(html), None);
    }

    #[test]
    fn test_script_text_keeps_entities_verbatim() {
        let html = r#"<script>publish_page = {"publish_info":"{&quot;a&quot;:1}"};</script>"#;

        let script = assignment_script(html).unwrap();
        assert_eq!(
            literal_of(&script),
            Some(r#"{"publish_info":"{&quot;a&quot;:1}"}"#)
        );
    }
}
