//! The orchestrator: purge, dimension phase, fact phase.

use std::{future::Future, time::Duration};

use chrono::Utc;
use resepti_core::{
  status::{LoadSummary, Phase, PhaseReport, RunReport},
  store::{SourceStore, WarehouseStore},
};
use tracing::{Instrument as _, error, info, info_span};
use uuid::Uuid;

use crate::{
  Error, Result, dimensions, facts,
  phase::{Worker, run_phase},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime knobs for a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
  /// Upper bound on how long one phase may take, covering both the
  /// completion messages and the task joins.
  pub phase_timeout: Duration,
}

impl Default for PipelineConfig {
  fn default() -> Self { Self { phase_timeout: Duration::from_secs(300) } }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// A full purge-and-reload of the warehouse from the source store.
pub struct Pipeline<S, W> {
  source:    S,
  warehouse: W,
  config:    PipelineConfig,
}

impl<S, W> Pipeline<S, W>
where
  S: SourceStore,
  W: WarehouseStore,
{
  pub fn new(source: S, warehouse: W, config: PipelineConfig) -> Self {
    Self { source, warehouse, config }
  }

  /// Run the pipeline once.
  ///
  /// A purge failure aborts the run with `Err`. Loader failures do not: they
  /// are recorded in the returned [`RunReport`], and a failed dimension phase
  /// skips the fact phase.
  pub async fn run(&self) -> Result<RunReport> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    async move {
      self.purge().await?;

      let dimensions = self.run_dimensions().await;
      let facts = if dimensions.is_success() {
        Some(self.run_facts().await)
      } else {
        error!(
          failed = dimensions.failures().count(),
          "dimension phase failed; skipping fact phase"
        );
        None
      };

      let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        dimensions,
        facts,
      };
      info!(success = report.is_success(), "run finished");
      Ok(report)
    }
    .instrument(info_span!("run", %run_id))
    .await
  }

  /// Delete every warehouse row, facts before dimensions, in one
  /// transaction.
  pub async fn purge(&self) -> Result<()> {
    info!("purging warehouse");
    self.warehouse.purge().await.map_err(Error::purge)
  }

  /// Phase 1: load the date, user and recipe dimensions in parallel.
  pub async fn run_dimensions(&self) -> PhaseReport {
    let workers = vec![
      self.worker(dimensions::RECIPES, |s, w| async move {
        dimensions::load_recipes(&s, &w).await
      }),
      self.worker(dimensions::DATES, |s, w| async move {
        dimensions::load_dates(&s, &w).await
      }),
      self.worker(dimensions::USERS, |s, w| async move {
        dimensions::load_users(&s, &w).await
      }),
    ];
    run_phase(Phase::Dimensions, workers, self.config.phase_timeout).await
  }

  /// Phase 2: load the fact tables in parallel. Reads the dimension rows
  /// written by [`Self::run_dimensions`].
  pub async fn run_facts(&self) -> PhaseReport {
    let workers = vec![
      self.worker(facts::RECIPE_FACTS, |s, w| async move {
        facts::load_recipe_facts(&s, &w).await
      }),
      self.worker(facts::COOKING_FACTS, |s, w| async move {
        facts::load_cooking_facts(&s, &w).await
      }),
    ];
    run_phase(Phase::Facts, workers, self.config.phase_timeout).await
  }

  /// Build a worker that owns its own clones of both store handles.
  fn worker<F, Fut>(&self, name: &'static str, load: F) -> Worker
  where
    F: FnOnce(S, W) -> Fut,
    Fut: Future<Output = Result<LoadSummary>> + Send + 'static,
  {
    Worker::new(name, load(self.source.clone(), self.warehouse.clone()))
  }
}
