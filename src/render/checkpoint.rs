//! Render watermark persisted between runs.

use std::fs;
use std::path::{Path, PathBuf};

use time::PrimitiveDateTime;
use time::macros::format_description;

use crate::{DashError, DashResult};

/// Parse a run folder name (`YYYY-MM-DDThh:mm:ss`, UTC) into Unix seconds.
pub fn parse_run_folder(name: &str) -> DashResult<i64> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let dt = PrimitiveDateTime::parse(name, &format).map_err(|source| {
        DashError::InvalidRunFolder {
            name: name.to_string(),
            source,
        }
    })?;
    Ok(dt.assume_utc().unix_timestamp())
}

/// Checkpoint file holding the watermark as decimal Unix seconds.
///
/// Run folders older than the watermark are considered rendered.
#[derive(Debug, Clone)]
pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CheckpointFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the watermark. A missing or non-numeric file is an error;
    /// there is no implicit starting point.
    pub fn read(&self) -> DashResult<i64> {
        let content = fs::read_to_string(&self.path).map_err(|e| DashError::io(&self.path, e))?;
        content
            .trim()
            .parse::<i64>()
            .map_err(|_| DashError::InvalidWatermark {
                path: self.path.clone(),
                content,
            })
    }

    /// Overwrite the watermark in place.
    pub fn write(&self, watermark: i64) -> DashResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| DashError::io(parent, e))?;
            }
        }
        fs::write(&self.path, watermark.to_string()).map_err(|e| DashError::io(&self.path, e))
    }
}
