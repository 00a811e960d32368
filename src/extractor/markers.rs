use regex::Regex;

use crate::extractor::model::{ExtractionError, MarkerPair, normalize_whitespace};

/// Pulls the span between the first start marker and the first end marker
/// after it out of flattened page text.
#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    markers: MarkerPair,
    pattern: Regex,
}

impl MarkerExtractor {
    pub fn new(markers: MarkerPair) -> Self {
        let pattern =
            Regex::new(&markers.pattern()).expect("marker characters are escaped into a literal");
        Self { markers, pattern }
    }

    pub fn markers(&self) -> MarkerPair {
        self.markers
    }

    pub fn extract(&self, page_text: &str) -> Result<String, ExtractionError> {
        let captures = self
            .pattern
            .captures(page_text)
            .ok_or(ExtractionError::MarkersNotFound)?;

        let content = normalize_whitespace(captures.get(1).map_or("", |m| m.as_str()));
        if content.is_empty() {
            return Err(ExtractionError::EmptyContent);
        }
        Ok(content)
    }
}

impl Default for MarkerExtractor {
    fn default() -> Self {
        Self::new(MarkerPair::default())
    }
}
