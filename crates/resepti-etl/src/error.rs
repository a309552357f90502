//! Error type for `resepti-etl`.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Reading the source store failed; nothing was written.
  #[error("extract failed: {0}")]
  Extract(#[source] BoxError),

  /// Reading or writing the warehouse failed; the unit of work was rolled
  /// back.
  #[error("load failed: {0}")]
  Load(#[source] BoxError),

  #[error("purge failed: {0}")]
  Purge(#[source] BoxError),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}

impl Error {
  pub(crate) fn extract(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Extract(Box::new(e))
  }

  pub(crate) fn load(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Load(Box::new(e))
  }

  pub(crate) fn purge(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Purge(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
