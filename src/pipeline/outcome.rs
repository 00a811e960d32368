use std::fmt::{self, Display, Formatter};

use crate::extractor::{ExtractionError, MarkerPair};
use crate::fetcher::FetchError;

pub const EMPTY_CONTENT: &str = "内容为空";
pub const NETWORK_FAILURE: &str = "网络错误";
pub const OTHER_FAILURE: &str = "未知错误";
pub const INVALID_URL: &str = "URL列为空或无效";
pub const ROW_TOO_SHORT: &str = "列数不足，无法获取URL";
pub const READ_COUNT_NOT_MATCHED: &str = "未找到阅读数";
pub const TITLE_MISSING: &str = "N/A";

/// Why extraction was not attempted for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The row has no cell at the URL column.
    RowTooShort,
    /// The URL cell is empty or not http(s).
    InvalidUrl,
}

/// What the content column of one output row holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    Extracted(String),
    Empty,
    MarkersNotFound(MarkerPair),
    NetworkFailure(String),
    OtherFailure(String),
    Skipped(SkipReason),
}

impl ContentOutcome {
    pub fn from_extraction(result: Result<String, ExtractionError>, markers: MarkerPair) -> Self {
        match result {
            Ok(text) => Self::Extracted(text),
            Err(ExtractionError::EmptyContent) => Self::Empty,
            Err(ExtractionError::MarkersNotFound) => Self::MarkersNotFound(markers),
        }
    }

    pub fn from_fetch_error(err: &FetchError) -> Self {
        if err.is_network() {
            Self::NetworkFailure(err.to_string())
        } else {
            Self::OtherFailure(err.to_string())
        }
    }
}

impl Display for ContentOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extracted(text) => f.write_str(text),
            Self::Empty => f.write_str(EMPTY_CONTENT),
            Self::MarkersNotFound(markers) => write!(
                f,
                "未找到'{start}{sep}'和'{end}{sep}'标记之间的内容",
                start = markers.start,
                end = markers.end,
                sep = markers.separator,
            ),
            Self::NetworkFailure(cause) => write!(f, "{NETWORK_FAILURE}: {cause}"),
            Self::OtherFailure(cause) => write!(f, "{OTHER_FAILURE}: {cause}"),
            Self::Skipped(SkipReason::InvalidUrl) => f.write_str(INVALID_URL),
            Self::Skipped(SkipReason::RowTooShort) => f.write_str(ROW_TOO_SHORT),
        }
    }
}

/// What the read-count column of one output row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCountOutcome {
    Matched(u64),
    NotMatched,
    /// The row has no cell at the title column.
    TitleMissing,
}

impl Display for ReadCountOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched(count) => write!(f, "{count}"),
            Self::NotMatched => f.write_str(READ_COUNT_NOT_MATCHED),
            Self::TitleMissing => f.write_str(TITLE_MISSING),
        }
    }
}

/// Per-outcome row counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub fetched: usize,
    pub extracted: usize,
    pub empty: usize,
    pub markers_not_found: usize,
    pub fetch_failed: usize,
    pub skipped: usize,
    pub matched: usize,
    pub unmatched: usize,
}

impl RunSummary {
    pub(crate) fn record(&mut self, content: &ContentOutcome, read_count: ReadCountOutcome) {
        self.rows += 1;

        match content {
            ContentOutcome::Extracted(_) => self.extracted += 1,
            ContentOutcome::Empty => self.empty += 1,
            ContentOutcome::MarkersNotFound(_) => self.markers_not_found += 1,
            ContentOutcome::NetworkFailure(_) | ContentOutcome::OtherFailure(_) => {
                self.fetch_failed += 1
            }
            ContentOutcome::Skipped(_) => self.skipped += 1,
        }
        if !matches!(content, ContentOutcome::Skipped(_)) {
            self.fetched += 1;
        }

        match read_count {
            ReadCountOutcome::Matched(_) => self.matched += 1,
            ReadCountOutcome::NotMatched | ReadCountOutcome::TitleMissing => self.unmatched += 1,
        }
    }
}
