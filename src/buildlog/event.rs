//! Extraction of build events from single `build.log` lines.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{DashError, DashResult};

/// `[<time>] <package> <anything> [<version>] (successful|failed) after <N>s`
static BUILD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(.*?)\] (.*?) .*? \[(.*?)\] (successful|failed) after ([0-9]+)s")
        .expect("valid regex")
});

/// Result of one build attempt, serialized as a fixed marker symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "✅")]
    Success,
    #[serde(rename = "❌")]
    Failure,
}

impl Outcome {
    fn from_word(word: &str) -> Self {
        if word == "successful" {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// One matched build line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub package: String,
    pub time: String,
    pub version: String,
    pub outcome: Outcome,
    /// Build duration in whole seconds
    pub during: u64,
}

/// Parse a single log line.
///
/// Returns `Ok(None)` for lines that do not describe a finished build.
/// A duration that does not fit in `u64` is an error; `line_no` (1-based)
/// is only used for the message.
pub fn parse_line(line_no: usize, line: &str) -> DashResult<Option<BuildEvent>> {
    let Some(caps) = BUILD_LINE.captures(line) else {
        return Ok(None);
    };

    let raw_during = &caps[5];
    let during = raw_during
        .parse::<u64>()
        .map_err(|_| DashError::InvalidDuration {
            line: line_no,
            value: raw_during.to_string(),
        })?;

    Ok(Some(BuildEvent {
        package: caps[2].to_string(),
        time: caps[1].to_string(),
        version: caps[3].to_string(),
        outcome: Outcome::from_word(&caps[4]),
        during,
    }))
}
