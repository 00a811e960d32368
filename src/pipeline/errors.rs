use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run. Row-level problems never surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read input {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output {}: {source}", path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input record: {0}")]
    MalformedInput(#[source] csv::Error),

    #[error("failed to write output row: {0}")]
    Write(#[source] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
