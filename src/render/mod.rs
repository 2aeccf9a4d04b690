//! Incremental rendering of terminal captures into HTML pages.
//!
//! The capture tree holds one folder per build run, named
//! `YYYY-MM-DDThh:mm:ss`, with one `<package>.<ext>` capture per package.
//! Every folder at or after the watermark is rendered to
//! `<dst>/<package>/<folder>.html`.
//!
//! The watermark is advanced to a folder's timestamp before that folder's
//! files are rendered and is never rolled back. A failure in the middle of
//! a folder therefore leaves the folder marked as the newest processed one;
//! because the boundary is inclusive the next run renders it again, but any
//! older folder that was pending is not revisited.

pub mod checkpoint;
pub mod page;
pub mod terminal;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::{DashError, DashResult};

pub use checkpoint::{CheckpointFile, parse_run_folder};
pub use page::{PageTemplate, TERMINAL_CSS};
pub use terminal::{AnsiRenderer, TerminalRenderer};

/// Counters for one incremental render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub folders_seen: usize,
    pub folders_rendered: usize,
    pub pages_written: usize,
    /// Watermark after the pass
    pub watermark: i64,
}

/// Package name of a capture file: the file name without its final
/// `.`-delimited segment. Names without an extension are used as-is.
pub fn package_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// List entry names of `dir` in ascending order, keeping only directories
/// (`dirs == true`) or only non-directories.
fn sorted_entries(dir: &Path, dirs: bool) -> DashResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DashError::io(dir, e))? {
        let entry = entry.map_err(|e| DashError::io(dir, e))?;
        // follows symlinks
        let is_dir = fs::metadata(entry.path())
            .map_err(|e| DashError::io(entry.path(), e))?
            .is_dir();
        if is_dir == dirs {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Renders capture folders that the watermark has not passed yet.
pub struct IncrementalRenderer<R> {
    renderer: R,
    template: PageTemplate,
}

impl<R: TerminalRenderer> IncrementalRenderer<R> {
    pub fn new(renderer: R, template: PageTemplate) -> Self {
        IncrementalRenderer { renderer, template }
    }

    /// Render one capture into a complete HTML page.
    pub fn render_page(&self, capture: &[u8]) -> Vec<u8> {
        self.template.splice(&self.renderer.render(capture))
    }

    /// Run one incremental pass over `src`, writing pages below `dst`.
    ///
    /// Any IO or parse error aborts the pass; pages already written and the
    /// already-advanced watermark stay as they are.
    pub fn run(
        &self,
        src: &Path,
        dst: &Path,
        checkpoint: &CheckpointFile,
    ) -> DashResult<RenderStats> {
        let mut watermark = checkpoint.read()?;
        info!(
            watermark,
            renderer = self.renderer.name(),
            src = %src.display(),
            "rendering captures"
        );

        let mut stats = RenderStats {
            watermark,
            ..RenderStats::default()
        };

        for folder in sorted_entries(src, true)? {
            stats.folders_seen += 1;
            let ts = parse_run_folder(&folder)?;
            if ts < watermark {
                continue;
            }

            watermark = ts;
            checkpoint.write(watermark)?;
            stats.watermark = watermark;

            let folder_path = src.join(&folder);
            let written = self.render_folder(&folder_path, &folder, dst)?;
            info!(folder = %folder, pages = written, "run folder rendered");
            stats.folders_rendered += 1;
            stats.pages_written += written;
        }

        Ok(stats)
    }

    fn render_folder(&self, folder_path: &Path, folder: &str, dst: &Path) -> DashResult<usize> {
        let mut written = 0;
        for file_name in sorted_entries(folder_path, false)? {
            let package = package_name(&file_name);
            let out_dir = dst.join(package);
            if !out_dir.is_dir() {
                fs::create_dir_all(&out_dir).map_err(|e| DashError::io(&out_dir, e))?;
            }

            let input_path = folder_path.join(&file_name);
            let capture = fs::read(&input_path).map_err(|e| DashError::io(&input_path, e))?;
            let page = self.render_page(&capture);

            let out_path = out_dir.join(format!("{folder}.html"));
            fs::write(&out_path, page).map_err(|e| DashError::io(&out_path, e))?;
            debug!(package, path = %out_path.display(), "page written");
            written += 1;
        }
        Ok(written)
    }
}
