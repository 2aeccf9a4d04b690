//! Maintainer registry built from the per-package metadata files.
//!
//! Each immediate subdirectory of the package-source tree is one package.
//! Its metadata file (`lilac.yaml` by default) carries a `maintainers` list;
//! only the `github` id of each entry is kept.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::{DashError, DashResult};

/// Default metadata file name inside each package directory.
pub const DEFAULT_METADATA_FILE: &str = "lilac.yaml";

/// Package name -> maintainer ids, in source order (duplicates kept).
pub type MaintainerMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Deserialize)]
struct PackageMetadata {
    #[serde(default)]
    maintainers: Option<Vec<MaintainerEntry>>,
}

#[derive(Debug, Deserialize)]
struct MaintainerEntry {
    github: String,
    #[allow(dead_code)]
    #[serde(default)]
    email: Option<String>,
}

/// Decode one metadata document into its list of maintainer ids.
///
/// An empty document has no maintainers.
pub fn parse_metadata(content: &str, path: &Path) -> DashResult<Vec<String>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let meta: PackageMetadata =
        serde_yaml::from_str(content).map_err(|source| DashError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(meta
        .maintainers
        .unwrap_or_default()
        .into_iter()
        .map(|m| m.github)
        .collect())
}

/// Scan `root` and build the maintainer map.
///
/// Hidden entries and plain files are skipped, as are package directories
/// without a metadata file. A metadata file that exists but cannot be read
/// or decoded aborts the scan.
pub fn load_maintainers(root: &Path, metadata_file: &str) -> DashResult<MaintainerMap> {
    let entries = fs::read_dir(root).map_err(|e| DashError::io(root, e))?;

    let mut packages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DashError::io(root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        // follows symlinks; a dangling link has no metadata file either
        let is_dir = match fs::metadata(entry.path()) {
            Ok(meta) => meta.is_dir(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(package = %name, "dangling symlink, skipping");
                false
            }
            Err(e) => return Err(DashError::io(entry.path(), e)),
        };
        if !is_dir {
            continue;
        }
        packages.push(name);
    }
    packages.sort();

    let mut map = MaintainerMap::new();
    for pkg in packages {
        let path = root.join(&pkg).join(metadata_file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(package = %pkg, "no metadata file, skipping");
                continue;
            }
            Err(e) => return Err(DashError::io(path, e)),
        };

        let ids = parse_metadata(&content, &path)?;
        if ids.is_empty() {
            debug!(package = %pkg, "no maintainers listed");
            continue;
        }
        map.entry(pkg).or_default().extend(ids);
    }

    Ok(map)
}
