use crate::fetcher::types::PageResponse;
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

const SNIFF_WINDOW: usize = 4096;

pub fn decode_response(
    url_final: Url,
    status: StatusCode,
    body_bytes: Bytes,
    content_type: &str,
) -> PageResponse {
    let charset = detect_charset(content_type, &body_bytes);
    let body_utf8 = decode_to_utf8(&body_bytes, charset);

    PageResponse {
        url_final,
        status,
        body_raw: body_bytes,
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    }
}

fn label_in(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let captures = regex.captures(haystack)?;
    let label = captures.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

pub(crate) fn detect_charset(content_type: &str, body_bytes: &[u8]) -> &'static Encoding {
    // 1. Check Content-Type header for charset
    if let Some(encoding) = label_in(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    // 2. Check for <meta charset> / http-equiv in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(SNIFF_WINDOW)];
    let search_str = String::from_utf8_lossy(search_bytes);

    if let Some(encoding) = label_in(&META_CHARSET_REGEX, &search_str) {
        return encoding;
    }
    if let Some(encoding) = label_in(&META_HTTP_EQUIV_REGEX, &search_str) {
        return encoding;
    }

    // 3. Use chardetng for heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, body_bytes.len() <= SNIFF_WINDOW);
    detector.guess(None, true)
}

pub(crate) fn decode_to_utf8(body_bytes: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, used, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        warn!(
            encoding = used.name(),
            "body contained malformed sequences, replaced with U+FFFD"
        );
    }

    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_charset_from_content_type() {
        let content_type = "text/html; charset=utf-8";
        let body = b"<html><head><title>Test</title></head></html>";

        assert_eq!(detect_charset(content_type, body), encoding_rs::UTF_8);
    }

    #[test]
    fn test_detect_charset_from_meta_tag() {
        let content_type = "text/html";
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>Test</title></head></html>";

        // ISO-8859-1 gets mapped to Windows1252 by encoding_rs since it's a superset
        assert_eq!(detect_charset(content_type, body), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_detect_charset_from_meta_http_equiv() {
        let content_type = "text/html";
        let body = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=gb2312\"><title>Test</title></head></html>";

        assert_eq!(detect_charset(content_type, body), encoding_rs::GBK);
    }

    #[test]
    fn test_decodes_gbk_page_declared_in_meta() {
        let (body, _, _) = encoding_rs::GBK.encode(
            "<html><head><meta charset=\"gbk\"></head><body><p>文：张三 图：李四</p></body></html>",
        );

        let charset = detect_charset("text/html", &body);
        assert_eq!(charset, encoding_rs::GBK);
        let decoded = decode_to_utf8(&body, charset);
        assert!(decoded.contains("文：张三"));
    }

    #[test]
    fn test_decode_utf8() {
        let body = "Hello, 世界!".as_bytes();

        let decoded = decode_to_utf8(body, encoding_rs::UTF_8);
        assert_eq!(decoded, "Hello, 世界!");
    }

    #[test]
    fn test_decode_is_lossy_on_malformed_input() {
        let body = b"ok \xFF\xFE done";

        let decoded = decode_to_utf8(body, encoding_rs::UTF_8);
        assert!(decoded.starts_with("ok "));
        assert!(decoded.ends_with(" done"));
        assert!(decoded.contains('\u{FFFD}'));
    }
}
