//! The row loop: read the source spreadsheet, fetch and extract each row's
//! page, look up its read count, and stream the augmented row to the output.

pub mod errors;
pub mod outcome;
pub mod source;

pub use errors::PipelineError;
pub use outcome::{ContentOutcome, ReadCountOutcome, RunSummary, SkipReason};
pub use source::{HttpPageSource, PageSource};

use encoding_rs::Encoding;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::extractor::{MarkerExtractor, MarkerPair, extract_from_html};
use crate::snapshot::ReadCountIndex;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Everything about a run that is fixed before the first row.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Zero-based index of the URL cell.
    pub url_column: usize,
    /// Zero-based index of the title cell.
    pub title_column: usize,
    /// Codepage of the input file.
    pub input_encoding: &'static Encoding,
    /// Pause after every live fetch.
    pub fetch_delay: Duration,
    pub content_header: String,
    pub read_count_header: String,
    pub markers: MarkerPair,
}

pub struct Pipeline<S> {
    source: S,
    settings: PipelineSettings,
    extractor: MarkerExtractor,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, settings: PipelineSettings) -> Self {
        let extractor = MarkerExtractor::new(settings.markers);
        Self {
            source,
            settings,
            extractor,
        }
    }

    /// Process every row of `input` into `output`, one row at a time.
    ///
    /// Each output row is flushed as soon as it is written, so a run that
    /// stops early leaves every completed row on disk.
    #[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    pub async fn run(
        &self,
        input: &Path,
        output: &Path,
        index: &ReadCountIndex,
    ) -> Result<RunSummary, PipelineError> {
        let text = self.read_input(input)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut file = File::create(output).map_err(|source| PipelineError::OutputCreate {
            path: output.to_path_buf(),
            source,
        })?;
        file.write_all(UTF8_BOM)?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);

        let mut records = reader.records();

        let mut header: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(PipelineError::MalformedInput)?
                .iter()
                .map(str::to_string)
                .collect(),
            None => {
                warn!("input has no header row");
                Vec::new()
            }
        };
        header.push(self.settings.content_header.clone());
        header.push(self.settings.read_count_header.clone());
        writer.write_record(&header).map_err(PipelineError::Write)?;
        writer.flush()?;

        let mut summary = RunSummary::default();

        for (position, record) in records.enumerate() {
            let record = record.map_err(PipelineError::MalformedInput)?;
            // Spreadsheet line number: 1-based, after the header.
            let line = position + 2;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();

            let content = self.content_for(line, &row).await;
            let read_count = self.read_count_for(line, &row, index);
            summary.record(&content, read_count);

            row.push(content.to_string());
            row.push(read_count.to_string());
            writer.write_record(&row).map_err(PipelineError::Write)?;
            writer.flush()?;
        }

        info!(
            rows = summary.rows,
            fetched = summary.fetched,
            extracted = summary.extracted,
            empty = summary.empty,
            markers_not_found = summary.markers_not_found,
            fetch_failed = summary.fetch_failed,
            skipped = summary.skipped,
            matched = summary.matched,
            unmatched = summary.unmatched,
            "run complete"
        );
        Ok(summary)
    }

    fn read_input(&self, input: &Path) -> Result<String, PipelineError> {
        let raw = fs::read(input).map_err(|source| match source.kind() {
            ErrorKind::NotFound => PipelineError::InputNotFound {
                path: input.to_path_buf(),
            },
            _ => PipelineError::InputRead {
                path: input.to_path_buf(),
                source,
            },
        })?;

        // A leading BOM overrides the configured encoding.
        let (text, used, had_errors) = self.settings.input_encoding.decode(&raw);
        if had_errors {
            warn!(
                encoding = used.name(),
                "input contains bytes invalid for its encoding, replaced with U+FFFD"
            );
        }
        Ok(text.into_owned())
    }

    async fn content_for(&self, line: usize, row: &[String]) -> ContentOutcome {
        let Some(cell) = row.get(self.settings.url_column) else {
            warn!(line, "row has no URL column, skipping extraction");
            return ContentOutcome::Skipped(SkipReason::RowTooShort);
        };

        let url = cell.trim();
        if !ACCEPTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            warn!(line, url, "not an http(s) URL, skipping extraction");
            return ContentOutcome::Skipped(SkipReason::InvalidUrl);
        }

        info!(line, url, "processing row");
        let outcome = match self.source.fetch_text(url).await {
            Ok(html) => ContentOutcome::from_extraction(
                extract_from_html(&html, &self.extractor),
                self.extractor.markers(),
            ),
            Err(err) => {
                warn!(line, url, error = %err, "fetch failed");
                ContentOutcome::from_fetch_error(&err)
            }
        };

        match &outcome {
            ContentOutcome::Empty => warn!(line, "span between markers is empty"),
            ContentOutcome::MarkersNotFound(_) => warn!(line, "markers not found on page"),
            _ => {}
        }

        // Only live fetches are paced.
        if !self.settings.fetch_delay.is_zero() {
            sleep(self.settings.fetch_delay).await;
        }

        outcome
    }

    fn read_count_for(&self, line: usize, row: &[String], index: &ReadCountIndex) -> ReadCountOutcome {
        let Some(title) = row.get(self.settings.title_column) else {
            warn!(line, "row has no title column, skipping read-count lookup");
            return ReadCountOutcome::TitleMissing;
        };

        match index.get(title.trim()) {
            Some(count) => ReadCountOutcome::Matched(count),
            None => ReadCountOutcome::NotMatched,
        }
    }
}
