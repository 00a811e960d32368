pub mod markers;
pub mod model;
pub mod reader;

#[cfg(test)]
mod tests;

pub use markers::MarkerExtractor;
pub use model::{ExtractionError, MarkerPair};

use std::sync::LazyLock;

static DEFAULT_EXTRACTOR: LazyLock<MarkerExtractor> = LazyLock::new(MarkerExtractor::default);

/// Extract the span between the default `文：` / `图：` markers from
/// flattened page text.
pub fn extract(page_text: &str) -> Result<String, ExtractionError> {
    DEFAULT_EXTRACTOR.extract(page_text)
}

/// Flatten an HTML document and run `extractor` over its rendered text.
pub fn extract_from_html(
    html: &str,
    extractor: &MarkerExtractor,
) -> Result<String, ExtractionError> {
    // 1. Strip tags, one space between text nodes
    let text = reader::page_text(html);

    // 2. First marker pair wins
    extractor.extract(&text)
}
