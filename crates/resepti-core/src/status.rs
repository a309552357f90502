//! Completion messages sent by loader workers and the reports built from them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a successful loader wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadSummary {
  /// Rows committed to the target table.
  pub inserted: usize,
  /// Fact candidates skipped because a dimension key did not resolve.
  /// Always zero for dimension loaders.
  pub dropped:  usize,
}

impl LoadSummary {
  pub fn inserted(inserted: usize) -> Self { Self { inserted, dropped: 0 } }
}

/// The single message a loader worker sends when it finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LoadStatus {
  Success(LoadSummary),
  Failure(String),
}

impl LoadStatus {
  pub fn is_success(&self) -> bool { matches!(self, Self::Success(_)) }
}

/// A loader's name paired with its completion status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
  pub loader: String,
  #[serde(flatten)]
  pub status: LoadStatus,
}

impl fmt::Display for WorkerReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.status {
      LoadStatus::Success(s) if s.dropped > 0 => write!(
        f,
        "{} done ({} rows, {} dropped)",
        self.loader, s.inserted, s.dropped
      ),
      LoadStatus::Success(s) => write!(f, "{} done ({} rows)", self.loader, s.inserted),
      LoadStatus::Failure(detail) => write!(f, "error with {}: {detail}", self.loader),
    }
  }
}

// ─── Phases ──────────────────────────────────────────────────────────────────

/// The two barriers of a run. Facts depend on dimensions written in the
/// first phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Dimensions,
  Facts,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Dimensions => "dimensions",
      Self::Facts => "facts",
    })
  }
}

/// Every worker report of one phase, in spawn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
  pub phase:   Phase,
  pub workers: Vec<WorkerReport>,
}

impl PhaseReport {
  pub fn is_success(&self) -> bool { self.workers.iter().all(|w| w.status.is_success()) }

  pub fn failures(&self) -> impl Iterator<Item = &WorkerReport> {
    self.workers.iter().filter(|w| !w.status.is_success())
  }
}

/// The outcome of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
  pub run_id:      Uuid,
  pub started_at:  DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub dimensions:  PhaseReport,
  /// `None` when the fact phase was skipped because a dimension loader
  /// failed.
  pub facts:       Option<PhaseReport>,
}

impl RunReport {
  pub fn is_success(&self) -> bool {
    self.dimensions.is_success() && self.facts.as_ref().is_some_and(PhaseReport::is_success)
  }
}
