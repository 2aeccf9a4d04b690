//! Published status index.
//!
//! Joins the maintainer registry with the build summaries and writes the
//! JSON array consumed by the status dashboard.

pub mod schema;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::buildlog::{BuildSummary, Outcome};
use crate::maintainers::MaintainerMap;
use crate::{DashError, DashResult};

pub use schema::{DEFAULT_HISTORY_LEN, MAINTAINER_SEPARATOR, PublishedRow};

/// Keep only the last `keep` outcomes, oldest first.
pub fn truncate_history(result: &[Outcome], keep: usize) -> Vec<Outcome> {
    let start = result.len().saturating_sub(keep);
    result[start..].to_vec()
}

/// Build one row per summarized package that has at least one maintainer.
///
/// Packages without maintainers are dropped; packages with maintainers but
/// no build history never appear. Rows follow the summary map order.
pub fn build_rows(
    summaries: &BTreeMap<String, BuildSummary>,
    maintainers: &MaintainerMap,
    history_len: usize,
) -> Vec<PublishedRow> {
    let mut rows = Vec::new();
    for (name, summary) in summaries {
        let ids = match maintainers.get(name) {
            Some(ids) if !ids.is_empty() => ids,
            _ => {
                debug!(package = %name, "no maintainer, dropped from index");
                continue;
            }
        };

        rows.push(PublishedRow {
            name: name.clone(),
            maintainers: ids.join(MAINTAINER_SEPARATOR),
            time: summary.time.clone(),
            during: summary.during,
            version: summary.version.clone(),
            result: truncate_history(&summary.result, history_len),
        });
    }
    rows
}

/// Write rows as a compact JSON array, overwriting `output_path`.
pub fn write_index_json(rows: &[PublishedRow], output_path: &Path) -> DashResult<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| DashError::io(parent, e))?;
        }
    }

    let json = serde_json::to_string(rows)?;
    fs::write(output_path, json).map_err(|e| DashError::io(output_path, e))?;
    Ok(())
}
