//! Read counts from an exported publish history page.
//!
//! The page carries its data in an inline `publish_page = {...};` script
//! assignment. [`repair_and_parse`] locates that assignment, repairs the
//! HTML-escaped `publish_info` strings in it, cuts out the object literal
//! and decodes both JSON layers. [`load_index`] wraps the whole thing for
//! the pipeline and never fails: any problem with the snapshot leaves the
//! index empty.

pub mod errors;
pub mod index;
pub mod locate;
pub mod model;
pub mod repair;

pub use errors::{RepairError, SnapshotError};
pub use index::ReadCountIndex;
pub use model::{ArticleStats, PublishEvent, PublishSnapshot};
pub use repair::repair_publish_info;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{error, info, instrument, warn};

use crate::snapshot::model::PublishPage;

pub fn repair_and_parse(html_bytes: &[u8]) -> Result<PublishSnapshot, RepairError> {
    let html = String::from_utf8_lossy(html_bytes);

    // 1. Script assignment, from its opening brace to the end of the script
    let script = locate::assignment_script(&html).ok_or(RepairError::ScriptNotFound)?;
    let tail = locate::assignment_tail(&script).ok_or(RepairError::ScriptNotFound)?;

    // 2. Re-escape the nested publish_info documents. Must run before the
    //    brace scan: a raw quote inside an escaped value ends its string.
    let repaired = repair_publish_info(tail);

    // 3. Right-hand side object literal
    let literal = locate::object_literal(&repaired).ok_or(RepairError::ScriptNotFound)?;

    // 4. Outer layer, then each event's inner layer
    let page: PublishPage = serde_json::from_str(literal)
        .map_err(|source| RepairError::unparseable(literal, source))?;

    Ok(PublishSnapshot::from_page(page))
}

pub fn load_snapshot(path: &Path) -> Result<PublishSnapshot, SnapshotError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SnapshotError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    Ok(repair_and_parse(&bytes)?)
}

/// Build the read-count index from the snapshot at `path`, degrading to an
/// empty index when the file is missing or cannot be decoded.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_index(path: &Path) -> ReadCountIndex {
    let snapshot = match load_snapshot(path) {
        Ok(snapshot) => snapshot,
        Err(SnapshotError::Unparseable(RepairError::Unparseable {
            offset,
            context,
            source,
        })) => {
            error!(
                offset,
                %context,
                error = %source,
                "publish snapshot could not be parsed; read counts unavailable"
            );
            return ReadCountIndex::default();
        }
        Err(err) => {
            warn!(error = %err, "publish snapshot unavailable; read counts unavailable");
            return ReadCountIndex::default();
        }
    };

    let index = ReadCountIndex::build(&snapshot);
    if index.is_empty() {
        warn!("publish snapshot contained no titled articles with read counts");
    } else {
        info!(
            events = snapshot.events.len(),
            titles = index.len(),
            "read-count index built"
        );
    }
    index
}
