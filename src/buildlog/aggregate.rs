//! Fold build events into per-package summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::{BuildEvent, Outcome, parse_line};
use crate::DashResult;

/// Latest build state of one package plus its outcome history.
///
/// `time`, `during` and `version` always come from the most recent event;
/// `result` holds every outcome, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub time: String,
    pub during: u64,
    pub version: String,
    pub result: Vec<Outcome>,
}

/// Accumulator for a single pass over the build log.
#[derive(Debug, Default)]
pub struct BuildLogAggregator {
    summaries: BTreeMap<String, BuildSummary>,
    matched: usize,
}

impl BuildLogAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the package summary from one event.
    pub fn ingest(&mut self, event: BuildEvent) {
        self.matched += 1;
        match self.summaries.get_mut(&event.package) {
            Some(summary) => {
                summary.time = event.time;
                summary.during = event.during;
                summary.version = event.version;
                summary.result.push(event.outcome);
            }
            None => {
                self.summaries.insert(
                    event.package,
                    BuildSummary {
                        time: event.time,
                        during: event.during,
                        version: event.version,
                        result: vec![event.outcome],
                    },
                );
            }
        }
    }

    /// Parse and ingest one raw line. Returns whether the line matched.
    pub fn ingest_line(&mut self, line_no: usize, line: &str) -> DashResult<bool> {
        match parse_line(line_no, line)? {
            Some(event) => {
                self.ingest(event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of lines folded in so far.
    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn into_summaries(self) -> BTreeMap<String, BuildSummary> {
        self.summaries
    }
}
