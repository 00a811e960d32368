use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Why no content could be taken from a page.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("start/end markers not found")]
    MarkersNotFound,

    #[error("span between markers is empty")]
    EmptyContent,
}

/// The two delimiters bounding the text to extract. Each marker is a literal
/// character followed, after optional whitespace, by the separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPair {
    pub start: char,
    pub end: char,
    pub separator: char,
}

impl MarkerPair {
    pub const fn new(start: char, end: char, separator: char) -> Self {
        Self {
            start,
            end,
            separator,
        }
    }

    pub(crate) fn pattern(&self) -> String {
        let sep = regex::escape(&self.separator.to_string());
        format!(
            r"(?s){start}\s*{sep}(.*?)\s*{end}\s*{sep}",
            start = regex::escape(&self.start.to_string()),
            end = regex::escape(&self.end.to_string()),
        )
    }
}

impl Default for MarkerPair {
    /// `文：` (text by) ... `图：` (photo by), with a full-width colon.
    fn default() -> Self {
        Self::new('文', '图', '：')
    }
}

/// Trim and collapse every whitespace run (spaces, tabs, newlines) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}
