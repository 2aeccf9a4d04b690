//! Row schema of the published JSON index.

use serde::{Deserialize, Serialize};

use crate::buildlog::Outcome;

/// Number of most recent outcomes kept per published row.
pub const DEFAULT_HISTORY_LEN: usize = 10;

/// Separator between maintainer ids in [`PublishedRow::maintainers`].
pub const MAINTAINER_SEPARATOR: &str = " / ";

/// One package in the dashboard index.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRow {
    /// Package name
    pub name: String,

    /// Maintainer ids joined with `" / "`
    pub maintainers: String,

    /// Timestamp of the last build, as written in the build log
    pub time: String,

    /// Duration of the last build in seconds
    pub during: u64,

    /// Version produced by the last build
    pub version: String,

    /// Most recent outcomes, oldest first
    pub result: Vec<Outcome>,
}
