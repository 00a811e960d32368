use std::fs;

use crate::extractor::{ExtractionError, MarkerExtractor, extract, extract_from_html};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

#[test]
fn test_extract_credit_from_nested_markup() {
    let html = fixture("wechat_article.html");

    let content = extract_from_html(&html, &MarkerExtractor::default()).unwrap();

    // &nbsp; and the inter-tag newlines collapse to single spaces
    assert_eq!(content, "张 三 李四");
}

#[test]
fn test_markers_inside_scripts_are_ignored() {
    let html = fixture("wechat_article.html");

    let content = extract_from_html(&html, &MarkerExtractor::default()).unwrap();
    assert!(!content.contains("不应被匹配"));
    assert!(!content.contains("第二处署名"));
}

#[test]
fn test_page_without_markers() {
    let html = fixture("no_markers.html");

    assert_eq!(
        extract_from_html(&html, &MarkerExtractor::default()),
        Err(ExtractionError::MarkersNotFound)
    );
}

#[test]
fn test_page_with_blank_credit_is_empty() {
    let html = fixture("empty_credit.html");

    assert_eq!(
        extract_from_html(&html, &MarkerExtractor::default()),
        Err(ExtractionError::EmptyContent)
    );
}

#[test]
fn test_malformed_html() {
    let html = "<html><body><p>文：<b>张三<div>图：李四";

    assert_eq!(
        extract_from_html(html, &MarkerExtractor::default()).unwrap(),
        "张三"
    );
}

#[test]
fn test_default_extract_on_plain_text() {
    assert_eq!(extract("  文 ：  王 五 \n 图 ：").unwrap(), "王 五");
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extract_from_html(&html, &MarkerExtractor::default());
        }

        #[test]
        fn test_extracted_content_is_normalized(
            body in "[a-z\u{4e00}-\u{4e10} \t\n]{0,40}",
            noise in "[a-z ]{0,10}",
        ) {
            let text = format!("{noise}文：{body}图：{noise}");
            match extract(&text) {
                Ok(content) => {
                    prop_assert_eq!(content.trim(), content.as_str());
                    prop_assert!(!content.contains("  "));
                    prop_assert!(!content.contains('\n'));
                    prop_assert!(!content.contains('\t'));
                }
                Err(err) => {
                    prop_assert_eq!(err, ExtractionError::EmptyContent);
                    prop_assert!(body.trim().is_empty());
                }
            }
        }
    }
}
