//! Repair of the `publish_info` field in an exported `publish_page` literal.
//!
//! The publish history page embeds a JSON document whose `publish_info`
//! values are themselves JSON documents serialised to strings. The page
//! escapes those inner documents as HTML (`&quot;` for `"`) instead of JSON
//! (`\"`), so the outer literal is not valid JSON as written:
//!
//! ```text
//! {"publish_list":[{"publish_type":1,"publish_info":"{&quot;appmsg_info&quot;:[...]}"}]}
//! ```
//!
//! [`repair_publish_info`] rewrites each such value into a proper JSON string
//! literal. It is a pure text transform and leaves values that are already
//! valid untouched, so running it twice is the same as running it once.

use regex::Regex;
use serde::de::IgnoredAny;
use std::borrow::Cow;
use std::sync::LazyLock;

static PUBLISH_INFO_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""publish_info"\s*:\s*""#).unwrap());

pub fn repair_publish_info(raw: &str) -> Cow<'_, str> {
    let keys: Vec<_> = PUBLISH_INFO_KEY.find_iter(raw).collect();

    let mut repaired = String::new();
    let mut cursor = 0;

    for (i, key) in keys.iter().enumerate() {
        // Key text inside a value we already rewrote.
        if key.start() < cursor {
            continue;
        }

        let value_start = key.end();
        let limit = keys.get(i + 1).map_or(raw.len(), |next| next.start());
        let Some(value_end) = closing_quote(raw, value_start, limit) else {
            continue;
        };

        let span = &raw[value_start..value_end];
        if already_valid(span) {
            continue;
        }

        // Drop the opening quote; the re-encoded literal brings its own.
        repaired.push_str(&raw[cursor..value_start - 1]);
        repaired.push_str(&reencode(span));
        cursor = value_end + 1;
    }

    if cursor == 0 {
        return Cow::Borrowed(raw);
    }
    repaired.push_str(&raw[cursor..]);
    Cow::Owned(repaired)
}

/// Index of the quote that closes the value starting at `from`.
///
/// The inner document is not escaped yet, so the first literal `"` is not
/// necessarily the end. Candidates are unescaped quotes followed by `,`, `}`
/// or `]`; the first one whose span decodes to JSON wins, otherwise the
/// first candidate.
fn closing_quote(raw: &str, from: usize, limit: usize) -> Option<usize> {
    let bytes = raw.as_bytes();
    let mut first_candidate = None;

    for index in from..limit.min(bytes.len()) {
        if bytes[index] != b'"' || is_escaped(bytes, from, index) || !closes_value(bytes, index) {
            continue;
        }

        let span = &raw[from..index];
        if already_valid(span) || is_json(&html_escape::decode_html_entities(span)) {
            return Some(index);
        }
        first_candidate.get_or_insert(index);
    }

    first_candidate
}

fn is_escaped(bytes: &[u8], from: usize, index: usize) -> bool {
    let backslashes = bytes[from..index]
        .iter()
        .rev()
        .take_while(|&&byte| byte == b'\\')
        .count();
    backslashes % 2 == 1
}

fn closes_value(bytes: &[u8], quote: usize) -> bool {
    bytes[quote + 1..]
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_none_or(|byte| matches!(byte, b',' | b'}' | b']'))
}

fn is_json(text: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(text).is_ok()
}

/// A span that is already a JSON string literal body carrying JSON.
fn already_valid(span: &str) -> bool {
    serde_json::from_str::<String>(&format!("\"{span}\"")).is_ok_and(|inner| is_json(&inner))
}

fn reencode(span: &str) -> String {
    let inner = html_escape::decode_html_entities(span);
    serde_json::Value::String(inner.into_owned()).to_string()
}
