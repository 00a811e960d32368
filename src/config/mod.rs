//! Configuration handling for a run.
//!
//! Every setting has a development default matching the usual layout of a
//! working folder (`1.csv` in, `发表记录.txt` as the snapshot) and can be
//! overridden through `ENRICH_*` environment variables. The binary layers its
//! command-line flags on top of what `Config::from_env` returns.

use encoding_rs::Encoding;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::extractor::MarkerPair;
use crate::pipeline::PipelineSettings;

/// Environment variable names.
pub const ENV_INPUT_CSV: &str = "ENRICH_INPUT_CSV";
pub const ENV_OUTPUT_CSV: &str = "ENRICH_OUTPUT_CSV";
pub const ENV_SNAPSHOT_HTML: &str = "ENRICH_SNAPSHOT_HTML";
pub const ENV_URL_COLUMN: &str = "ENRICH_URL_COLUMN";
pub const ENV_TITLE_COLUMN: &str = "ENRICH_TITLE_COLUMN";
pub const ENV_INPUT_ENCODING: &str = "ENRICH_INPUT_ENCODING";
pub const ENV_FETCH_DELAY_MS: &str = "ENRICH_FETCH_DELAY_MS";
pub const ENV_MARKERS: &str = "ENRICH_MARKERS";

const DEFAULT_INPUT_CSV: &str = "1.csv";
const DEFAULT_OUTPUT_CSV: &str = "输出结果_含阅读数.csv";
const DEFAULT_SNAPSHOT_HTML: &str = "发表记录.txt";
const DEFAULT_URL_COLUMN: usize = 3;
const DEFAULT_TITLE_COLUMN: usize = 2;
const DEFAULT_INPUT_ENCODING: &str = "gbk";
const DEFAULT_FETCH_DELAY_MS: u64 = 1000;
const DEFAULT_CONTENT_HEADER: &str = "通讯员";
const DEFAULT_READ_COUNT_HEADER: &str = "阅读数";

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    input_csv: PathBuf,
    output_csv: PathBuf,
    snapshot_html: PathBuf,
    url_column: usize,
    title_column: usize,
    input_encoding: &'static Encoding,
    fetch_delay: Duration,
    markers: MarkerPair,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = |key: &str, default: &str| {
            PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()))
        };

        let url_column = match lookup(ENV_URL_COLUMN) {
            Some(raw) => parse_number(ENV_URL_COLUMN, &raw)?,
            None => DEFAULT_URL_COLUMN,
        };
        let title_column = match lookup(ENV_TITLE_COLUMN) {
            Some(raw) => parse_number(ENV_TITLE_COLUMN, &raw)?,
            None => DEFAULT_TITLE_COLUMN,
        };
        let fetch_delay_ms = match lookup(ENV_FETCH_DELAY_MS) {
            Some(raw) => parse_number(ENV_FETCH_DELAY_MS, &raw)?,
            None => DEFAULT_FETCH_DELAY_MS,
        };
        let input_encoding = parse_encoding(
            &lookup(ENV_INPUT_ENCODING).unwrap_or_else(|| DEFAULT_INPUT_ENCODING.to_string()),
        )?;
        let markers = match lookup(ENV_MARKERS) {
            Some(raw) => parse_markers(&raw)?,
            None => MarkerPair::default(),
        };

        Ok(Self {
            input_csv: path(ENV_INPUT_CSV, DEFAULT_INPUT_CSV),
            output_csv: path(ENV_OUTPUT_CSV, DEFAULT_OUTPUT_CSV),
            snapshot_html: path(ENV_SNAPSHOT_HTML, DEFAULT_SNAPSHOT_HTML),
            url_column,
            title_column,
            input_encoding,
            fetch_delay: Duration::from_millis(fetch_delay_ms),
            markers,
        })
    }

    pub fn with_input_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_csv = path.into();
        self
    }

    pub fn with_output_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_csv = path.into();
        self
    }

    pub fn with_snapshot_html(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_html = path.into();
        self
    }

    pub fn with_columns(mut self, url_column: Option<usize>, title_column: Option<usize>) -> Self {
        self.url_column = url_column.unwrap_or(self.url_column);
        self.title_column = title_column.unwrap_or(self.title_column);
        self
    }

    pub fn with_input_encoding(mut self, label: &str) -> Result<Self, ConfigError> {
        self.input_encoding = parse_encoding(label)?;
        Ok(self)
    }

    /// Start marker, end marker and separator as one string, e.g. `文图：`.
    pub fn with_markers(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.markers = parse_markers(raw)?;
        Ok(self)
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Source spreadsheet.
    pub fn input_csv(&self) -> &Path {
        &self.input_csv
    }
    /// Augmented spreadsheet written by the run.
    pub fn output_csv(&self) -> &Path {
        &self.output_csv
    }
    /// Saved publish history page.
    pub fn snapshot_html(&self) -> &Path {
        &self.snapshot_html
    }
    pub fn url_column(&self) -> usize {
        self.url_column
    }
    pub fn title_column(&self) -> usize {
        self.title_column
    }
    pub fn input_encoding(&self) -> &'static Encoding {
        self.input_encoding
    }
    pub fn fetch_delay(&self) -> Duration {
        self.fetch_delay
    }
    pub fn markers(&self) -> MarkerPair {
        self.markers
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            url_column: self.url_column,
            title_column: self.title_column,
            input_encoding: self.input_encoding,
            fetch_delay: self.fetch_delay,
            content_header: DEFAULT_CONTENT_HEADER.to_string(),
            read_count_header: DEFAULT_READ_COUNT_HEADER.to_string(),
            markers: self.markers,
        }
    }
}

/// Errors that can occur while building a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err: T::Err| ConfigError::InvalidValue {
        field,
        reason: format!("{raw:?}: {err}"),
    })
}

fn parse_encoding(label: &str) -> Result<&'static Encoding, ConfigError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ConfigError::InvalidValue {
        field: ENV_INPUT_ENCODING,
        reason: format!("unknown encoding {label:?}"),
    })
}

/// Three characters: start marker, end marker, separator (e.g. `文图：`).
fn parse_markers(raw: &str) -> Result<MarkerPair, ConfigError> {
    let chars: Vec<char> = raw.trim().chars().collect();
    match chars.as_slice() {
        [start, end, separator] => Ok(MarkerPair::new(*start, *end, *separator)),
        _ => Err(ConfigError::InvalidValue {
            field: ENV_MARKERS,
            reason: format!("expected start, end and separator characters, got {raw:?}"),
        }),
    }
}
