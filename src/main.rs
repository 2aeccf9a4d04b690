#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use buildlog_dash::config::{DashConfig, PathsConfig, load_config};
use buildlog_dash::pipeline;
use buildlog_dash::render::{AnsiRenderer, parse_run_folder};

#[derive(Parser, Debug)]
#[command(name = "buildlog-dash")]
#[command(about = "Render build captures and publish the build status index", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set BUILDLOG_DASH_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(long, short, global = true, env = "BUILDLOG_DASH_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    paths: PathArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Per-path overrides of the `[paths]` table.
#[derive(Args, Debug, Default)]
struct PathArgs {
    /// Package-source tree (one metadata file per package)
    #[arg(long, global = true)]
    maintainers_root: Option<PathBuf>,
    /// Build log file
    #[arg(long, global = true)]
    build_log: Option<PathBuf>,
    /// Directory of timestamp-named capture folders
    #[arg(long, global = true)]
    capture_root: Option<PathBuf>,
    /// Output directory for rendered pages
    #[arg(long, global = true)]
    html_root: Option<PathBuf>,
    /// Watermark file
    #[arg(long, global = true)]
    checkpoint: Option<PathBuf>,
    /// Output JSON index
    #[arg(long, global = true)]
    index_json: Option<PathBuf>,
}

impl From<PathArgs> for PathsConfig {
    fn from(a: PathArgs) -> Self {
        PathsConfig {
            maintainers_root: a.maintainers_root,
            build_log: a.build_log,
            capture_root: a.capture_root,
            html_root: a.html_root,
            checkpoint: a.checkpoint,
            index_json: a.index_json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full run: load maintainers, parse the build log, render new captures, write the index
    Run,

    /// Render new captures only
    Render,

    /// Write the index only (no rendering)
    Index,

    /// Create the watermark file
    InitCheckpoint {
        /// Start from this run folder (YYYY-MM-DDThh:mm:ss)
        #[arg(long, conflicts_with = "epoch")]
        at: Option<String>,
        /// Start from these Unix seconds (default 0: render everything)
        #[arg(long)]
        epoch: Option<i64>,
        /// Overwrite an existing watermark
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("BUILDLOG_DASH_LOG").unwrap_or_else(|_| {
        if verbose { "buildlog_dash=debug".to_string() } else { "buildlog_dash=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn resolve_config(config: Option<PathBuf>, paths: PathArgs) -> anyhow::Result<DashConfig> {
    let mut cfg = match config {
        Some(path) => load_config(&path).with_context(|| format!("loading {}", path.display()))?,
        None => DashConfig::default(),
    };
    cfg.apply_overrides(paths.into());
    Ok(cfg)
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.config, cli.paths)?;

    match cli.command {
        Commands::Run => {
            let report = pipeline::run(&config, AnsiRenderer::new()).context("run failed")?;
            info!(?report, "run complete");
        }
        Commands::Render => {
            pipeline::render_captures(&config, AnsiRenderer::new()).context("rendering captures")?;
        }
        Commands::Index => {
            let report = pipeline::publish_index(&config).context("publishing index")?;
            info!(?report, "index complete");
        }
        Commands::InitCheckpoint { at, epoch, force } => {
            let watermark = match (at, epoch) {
                (Some(folder), None) => parse_run_folder(&folder)?,
                (None, Some(secs)) if secs < 0 => bail!("--epoch must not be negative"),
                (None, Some(secs)) => secs,
                (None, None) => 0,
                (Some(_), Some(_)) => bail!("--at and --epoch are mutually exclusive"),
            };
            pipeline::init_checkpoint(&config, watermark, force)?;
        }
    }
    Ok(())
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run_cli(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
