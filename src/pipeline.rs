//! Stage orchestration for one invocation.
//!
//! Stages run sequentially: maintainers, build log, captures, then the
//! join that writes the index. The first error aborts the run and the
//! index is only written once every earlier stage has succeeded.

use std::collections::BTreeMap;

use tracing::info;

use crate::buildlog::{BuildSummary, parse_build_log};
use crate::config::{DashConfig, PathKey};
use crate::index::{build_rows, write_index_json};
use crate::maintainers::{MaintainerMap, load_maintainers};
use crate::render::{
    CheckpointFile, IncrementalRenderer, PageTemplate, RenderStats, TerminalRenderer,
};
use crate::{DashError, DashResult};

/// Summary of a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub packages_with_maintainers: usize,
    pub packages_with_history: usize,
    pub rows_published: usize,
    pub render: Option<RenderStats>,
}

fn load_inputs(config: &DashConfig) -> DashResult<(MaintainerMap, BTreeMap<String, BuildSummary>)> {
    let root = config.require(PathKey::MaintainersRoot)?;
    let maintainers = load_maintainers(root, &config.maintainers.metadata_file)?;
    info!(packages = maintainers.len(), root = %root.display(), "maintainers loaded");

    let log = config.require(PathKey::BuildLog)?;
    let summaries = parse_build_log(log)?;
    info!(packages = summaries.len(), log = %log.display(), "build log parsed");

    Ok((maintainers, summaries))
}

fn publish(
    config: &DashConfig,
    maintainers: &MaintainerMap,
    summaries: &BTreeMap<String, BuildSummary>,
) -> DashResult<usize> {
    let out = config.require(PathKey::IndexJson)?;
    let rows = build_rows(summaries, maintainers, config.index.history_len);
    write_index_json(&rows, out)?;
    info!(rows = rows.len(), path = %out.display(), "index written");
    Ok(rows.len())
}

/// Render pending captures only.
pub fn render_captures<R: TerminalRenderer>(
    config: &DashConfig,
    renderer: R,
) -> DashResult<RenderStats> {
    let src = config.require(PathKey::CaptureRoot)?;
    let dst = config.require(PathKey::HtmlRoot)?;
    let checkpoint = CheckpointFile::new(config.require(PathKey::Checkpoint)?);

    let stats =
        IncrementalRenderer::new(renderer, PageTemplate::default()).run(src, dst, &checkpoint)?;
    info!(
        folders = stats.folders_rendered,
        pages = stats.pages_written,
        watermark = stats.watermark,
        "captures rendered"
    );
    Ok(stats)
}

/// Load maintainers and build log, then write the index. No rendering.
pub fn publish_index(config: &DashConfig) -> DashResult<RunReport> {
    let (maintainers, summaries) = load_inputs(config)?;
    let rows_published = publish(config, &maintainers, &summaries)?;
    Ok(RunReport {
        packages_with_maintainers: maintainers.len(),
        packages_with_history: summaries.len(),
        rows_published,
        render: None,
    })
}

/// Full run: maintainers, build log, captures, index.
pub fn run<R: TerminalRenderer>(config: &DashConfig, renderer: R) -> DashResult<RunReport> {
    let (maintainers, summaries) = load_inputs(config)?;
    let render = render_captures(config, renderer)?;
    let rows_published = publish(config, &maintainers, &summaries)?;
    Ok(RunReport {
        packages_with_maintainers: maintainers.len(),
        packages_with_history: summaries.len(),
        rows_published,
        render: Some(render),
    })
}

/// Seed the watermark file. Refuses to replace an existing one unless `force`.
pub fn init_checkpoint(config: &DashConfig, watermark: i64, force: bool) -> DashResult<()> {
    let checkpoint = CheckpointFile::new(config.require(PathKey::Checkpoint)?);
    if checkpoint.exists() && !force {
        return Err(DashError::Message(format!(
            "checkpoint already exists: {} (use --force to overwrite)",
            checkpoint.path().display()
        )));
    }
    checkpoint.write(watermark)?;
    info!(watermark, path = %checkpoint.path().display(), "checkpoint initialized");
    Ok(())
}
