use std::path::PathBuf;
use thiserror::Error;

const CONTEXT_RADIUS: usize = 100;

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("no <script> assigns publish_page = {{...}}")]
    ScriptNotFound,

    #[error("publish_page is not valid JSON after repair at byte {offset}: {source}")]
    Unparseable {
        offset: usize,
        /// Up to 100 bytes either side of `offset` in the repaired text.
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RepairError {
    pub(crate) fn unparseable(repaired: &str, source: serde_json::Error) -> Self {
        let offset = byte_offset(repaired, source.line(), source.column());
        let start = floor_boundary(repaired, offset.saturating_sub(CONTEXT_RADIUS));
        let end = ceil_boundary(repaired, offset.saturating_add(CONTEXT_RADIUS));

        Self::Unparseable {
            offset,
            context: repaired[start..end].to_string(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read snapshot {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Unparseable(#[from] RepairError),
}

// serde_json reports 1-based line/column; column counts bytes.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
