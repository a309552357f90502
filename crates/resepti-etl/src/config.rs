//! File and environment configuration for the ETL binary.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

use crate::{PipelineConfig, Result};

/// Environment variables with this prefix override file settings, e.g.
/// `RESEPTI_WAREHOUSE_PATH`.
pub const ENV_PREFIX: &str = "RESEPTI";

fn default_phase_timeout_secs() -> u64 { 300 }

/// Runtime configuration, deserialised from a TOML file plus environment.
#[derive(Debug, Deserialize, Clone)]
pub struct EtlConfig {
  pub source_path:        PathBuf,
  pub warehouse_path:     PathBuf,
  #[serde(default = "default_phase_timeout_secs")]
  pub phase_timeout_secs: u64,
}

impl EtlConfig {
  /// Read `path` (if it exists) and overlay `RESEPTI_*` variables.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn pipeline(&self) -> PipelineConfig {
    PipelineConfig { phase_timeout: Duration::from_secs(self.phase_timeout_secs) }
  }
}
