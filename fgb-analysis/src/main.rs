//! fgb-analysis - Figure-ground bias analysis command-line tool
//!
//! Runs the full pipeline over the primary figure/ground CSV (and the optional
//! side-choice CSV), prints the summary tables and optionally exports JSON and
//! SVG charts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fgb_analysis::report::{charts, CliFormatter};
use fgb_analysis::run_from_files;
use fgb_common::config::load_config;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for fgb-analysis
#[derive(Parser, Debug)]
#[command(name = "fgb-analysis")]
#[command(about = "Chi-square analysis of figure-ground and side-choice bias by reading direction")]
#[command(version)]
struct Args {
    /// Primary figure/ground responses CSV
    #[arg(short, long, value_name = "FILE", env = "FGB_PRIMARY")]
    primary: PathBuf,

    /// Optional left/right side-choice responses CSV
    #[arg(short, long, value_name = "FILE", env = "FGB_SIDE")]
    side: Option<PathBuf>,

    /// Analysis config TOML (falls back to FGB_CONFIG, user config, defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render SVG charts into this directory
    #[arg(long, value_name = "DIR")]
    charts: Option<PathBuf>,

    /// Export the full report as JSON
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Do not print summary tables
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config comes first: its logging level is the fallback filter, so the
    // resolved source is logged only after the subscriber is installed
    let (config, source) = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting FGB analysis (fgb-analysis) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if source.is_fallback() {
        warn!("Configuration: {}", source);
    } else {
        info!("Configuration: {}", source);
    }

    let report = match run_from_files(&args.primary, args.side.as_deref(), &config) {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(e).context("Analysis failed");
        }
    };

    if !args.quiet {
        println!("{}", CliFormatter::format_report(&report));
    }

    if let Some(path) = &args.export {
        report
            .export_json(path)
            .with_context(|| format!("Failed to export report to {}", path.display()))?;
        info!("✓ Report exported to {}", path.display());
    }

    if let Some(dir) = &args.charts {
        let written = charts::render_all(&report, dir)
            .with_context(|| format!("Failed to render charts into {}", dir.display()))?;
        for path in written {
            info!("✓ Chart written: {}", path.display());
        }
    }

    Ok(())
}
