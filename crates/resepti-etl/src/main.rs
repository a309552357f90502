//! resepti-etl binary.
//!
//! Reads `resepti.toml` (or the path specified with `--config`), opens the
//! source and warehouse SQLite databases, and rebuilds the warehouse once.
//! Exits non-zero if any loader failed or the fact phase was skipped.

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use clap::Parser;
use resepti_core::status::RunReport;
use resepti_etl::{EtlConfig, Pipeline};
use resepti_store_sqlite::{SqliteSource, SqliteWarehouse};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rebuild the resepti warehouse from the source database")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "resepti.toml")]
  config: PathBuf,

  /// Print the run report as JSON instead of status lines.
  #[arg(long)]
  json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  // Logs go to stderr so `--json` output stays parseable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let cfg = EtlConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let source_path = expand_tilde(&cfg.source_path);
  let warehouse_path = expand_tilde(&cfg.warehouse_path);

  let source = SqliteSource::open(&source_path)
    .await
    .with_context(|| format!("failed to open source store at {source_path:?}"))?;
  let warehouse = SqliteWarehouse::open(&warehouse_path)
    .await
    .with_context(|| format!("failed to open warehouse at {warehouse_path:?}"))?;

  let report = Pipeline::new(source, warehouse, cfg.pipeline())
    .run()
    .await
    .context("warehouse run aborted")?;

  if cli.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_status(&report);
  }

  Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// One line per worker, then the closing banner.
fn print_status(report: &RunReport) {
  for worker in &report.dimensions.workers {
    println!("{worker}");
  }
  match &report.facts {
    Some(facts) => {
      for worker in &facts.workers {
        println!("{worker}");
      }
    }
    None => println!("fact phase skipped"),
  }
  println!("############### all done");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
