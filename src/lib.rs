pub mod buildlog;
pub mod config;
pub mod index;
pub mod maintainers;
pub mod pipeline;
pub mod render;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("{0}")]
    Message(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize index: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid run folder name {name:?} (expected YYYY-MM-DDThh:mm:ss)")]
    InvalidRunFolder {
        name: String,
        #[source]
        source: time::error::Parse,
    },

    #[error("invalid watermark in {}: {content:?}", path.display())]
    InvalidWatermark { path: PathBuf, content: String },

    #[error("invalid build duration {value:?} on line {line}")]
    InvalidDuration { line: usize, value: String },
}

impl DashError {
    /// Attach the offending path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type DashResult<T> = Result<T, DashError>;
