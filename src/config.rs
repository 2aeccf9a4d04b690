//! Run configuration.
//!
//! Paths come from a TOML file and can be overridden from the command line:
//!
//! ```toml
//! [paths]
//! maintainers_root = "/srv/repo/packages"
//! build_log = "/srv/builder/build.log"
//! capture_root = "/srv/builder/log"
//! html_root = "/srv/www/log"
//! checkpoint = "/var/lib/buildlog-dash/timestamp"
//! index_json = "/srv/www/build-log.json"
//!
//! [maintainers]
//! metadata_file = "lilac.yaml"
//!
//! [index]
//! history_len = 10
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::index::DEFAULT_HISTORY_LEN;
use crate::maintainers::DEFAULT_METADATA_FILE;
use crate::{DashError, DashResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Package-source tree with one metadata file per package
    pub maintainers_root: Option<PathBuf>,
    /// Append-only build log
    pub build_log: Option<PathBuf>,
    /// Tree of timestamp-named capture folders
    pub capture_root: Option<PathBuf>,
    /// Output tree for rendered pages
    pub html_root: Option<PathBuf>,
    /// Watermark file
    pub checkpoint: Option<PathBuf>,
    /// Published JSON index
    pub index_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaintainersConfig {
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
}

impl Default for MaintainersConfig {
    fn default() -> Self {
        MaintainersConfig {
            metadata_file: default_metadata_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            history_len: default_history_len(),
        }
    }
}

fn default_metadata_file() -> String {
    DEFAULT_METADATA_FILE.to_string()
}

fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub maintainers: MaintainersConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

/// Path settings, named as in the `[paths]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKey {
    MaintainersRoot,
    BuildLog,
    CaptureRoot,
    HtmlRoot,
    Checkpoint,
    IndexJson,
}

impl PathKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PathKey::MaintainersRoot => "maintainers_root",
            PathKey::BuildLog => "build_log",
            PathKey::CaptureRoot => "capture_root",
            PathKey::HtmlRoot => "html_root",
            PathKey::Checkpoint => "checkpoint",
            PathKey::IndexJson => "index_json",
        }
    }
}

impl DashConfig {
    /// Return a configured path or an error naming the missing setting.
    pub fn require(&self, key: PathKey) -> DashResult<&Path> {
        let p = &self.paths;
        let value = match key {
            PathKey::MaintainersRoot => &p.maintainers_root,
            PathKey::BuildLog => &p.build_log,
            PathKey::CaptureRoot => &p.capture_root,
            PathKey::HtmlRoot => &p.html_root,
            PathKey::Checkpoint => &p.checkpoint,
            PathKey::IndexJson => &p.index_json,
        };
        value.as_deref().ok_or_else(|| {
            DashError::Message(format!(
                "missing path setting `{}` (set [paths].{} or pass it on the command line)",
                key.as_str(),
                key.as_str()
            ))
        })
    }

    /// Replace each path for which an override is given.
    pub fn apply_overrides(&mut self, overrides: PathsConfig) {
        let p = &mut self.paths;
        let PathsConfig {
            maintainers_root,
            build_log,
            capture_root,
            html_root,
            checkpoint,
            index_json,
        } = overrides;
        if maintainers_root.is_some() {
            p.maintainers_root = maintainers_root;
        }
        if build_log.is_some() {
            p.build_log = build_log;
        }
        if capture_root.is_some() {
            p.capture_root = capture_root;
        }
        if html_root.is_some() {
            p.html_root = html_root;
        }
        if checkpoint.is_some() {
            p.checkpoint = checkpoint;
        }
        if index_json.is_some() {
            p.index_json = index_json;
        }
    }
}

pub fn parse_config(s: &str, path: &Path) -> DashResult<DashConfig> {
    toml::from_str(s).map_err(|source| DashError::Config {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_config(path: &Path) -> DashResult<DashConfig> {
    let s = std::fs::read_to_string(path).map_err(|e| DashError::io(path, e))?;
    parse_config(&s, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_config(
            r#"
[paths]
maintainers_root = "/repo"
build_log = "/b/build.log"
capture_root = "/b/log"
html_root = "/www/log"
checkpoint = "/state/timestamp"
index_json = "/www/build-log.json"

[maintainers]
metadata_file = "meta.yaml"

[index]
history_len = 5
"#,
            Path::new("dash.toml"),
        )
        .unwrap();

        assert_eq!(cfg.require(PathKey::BuildLog).unwrap(), Path::new("/b/build.log"));
        assert_eq!(cfg.require(PathKey::IndexJson).unwrap(), Path::new("/www/build-log.json"));
        assert_eq!(cfg.maintainers.metadata_file, "meta.yaml");
        assert_eq!(cfg.index.history_len, 5);
    }

    #[test]
    fn test_defaults() {
        let cfg = parse_config("", Path::new("dash.toml")).unwrap();
        assert_eq!(cfg.maintainers.metadata_file, "lilac.yaml");
        assert_eq!(cfg.index.history_len, 10);

        let err = cfg.require(PathKey::Checkpoint).unwrap_err();
        assert!(err.to_string().contains("checkpoint"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_config("[paths]\nbuildlog = \"/x\"\n", Path::new("dash.toml")).unwrap_err();
        assert!(matches!(err, DashError::Config { .. }));
    }

    #[test]
    fn test_overrides_replace_only_given_paths() {
        let mut cfg = parse_config(
            "[paths]\nbuild_log = \"/a\"\nhtml_root = \"/h\"\n",
            Path::new("dash.toml"),
        )
        .unwrap();
        cfg.apply_overrides(PathsConfig {
            build_log: Some(PathBuf::from("/b")),
            ..PathsConfig::default()
        });
        assert_eq!(cfg.require(PathKey::BuildLog).unwrap(), Path::new("/b"));
        assert_eq!(cfg.require(PathKey::HtmlRoot).unwrap(), Path::new("/h"));
    }
}
