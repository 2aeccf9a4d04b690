//! Build-log aggregation.
//!
//! The build daemon appends one line per finished build to `build.log`.
//! This module extracts those lines and reconstructs, per package, the most
//! recent build plus the full outcome history in file order.

pub mod aggregate;
pub mod event;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{DashError, DashResult};

pub use aggregate::{BuildLogAggregator, BuildSummary};
pub use event::{BuildEvent, Outcome, parse_line};

/// Read `path` whole and fold every matching line, in file order.
pub fn parse_build_log(path: &Path) -> DashResult<BTreeMap<String, BuildSummary>> {
    let bytes = fs::read(path).map_err(|e| DashError::io(path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    let mut agg = BuildLogAggregator::new();
    for (i, line) in content.lines().enumerate() {
        agg.ingest_line(i + 1, line)?;
    }
    debug!(matched = agg.matched(), "build log folded");

    Ok(agg.into_summaries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_build_log_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build.log");
        fs::write(
            &path,
            "[2024-01-01T00:00:00] foo 1.0-1 [1.0-1] successful after 12s\n\
             garbage line\n\
             [2024-01-01T01:00:00] bar 0.1-1 [0.2-1] failed after 5s\n",
        )
        .unwrap();

        let summaries = parse_build_log(&path).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries["foo"].during, 12);
        assert_eq!(summaries["foo"].result, vec![Outcome::Success]);
        assert_eq!(summaries["bar"].version, "0.2-1");
    }

    #[test]
    fn test_missing_build_log_is_error() {
        let temp = TempDir::new().unwrap();
        let result = parse_build_log(&temp.path().join("missing.log"));
        assert!(matches!(result, Err(DashError::Io { .. })));
    }

    #[test]
    fn test_crlf_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build.log");
        fs::write(&path, "[t] foo 1 [1] successful after 4s\r\n[t] foo 1 [1] failed after 5s\r\n")
            .unwrap();
        let summaries = parse_build_log(&path).unwrap();
        assert_eq!(summaries["foo"].result, vec![Outcome::Success, Outcome::Failure]);
        assert_eq!(summaries["foo"].during, 5);
    }
}
