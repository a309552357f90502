//! The fan-out/fan-in barrier that runs one phase of loaders.
//!
//! Every [`Worker`] is spawned on its own tokio task and reports through its
//! own oneshot channel. [`run_phase`] first receives one message per worker,
//! then joins every task. Both waits share one deadline, so a worker that
//! never reports or never terminates is turned into a `Failure` instead of
//! blocking the run.

use std::{future::Future, time::Duration};

use futures::{FutureExt as _, future::BoxFuture};
use resepti_core::status::{LoadStatus, LoadSummary, Phase, PhaseReport, WorkerReport};
use tokio::{
  sync::oneshot,
  task::JoinHandle,
  time::{Instant, timeout_at},
};
use tracing::{error, info};

use crate::Result;

/// A named loader, ready to be spawned.
pub struct Worker {
  name: &'static str,
  task: BoxFuture<'static, Result<LoadSummary>>,
}

impl Worker {
  pub fn new<F>(name: &'static str, task: F) -> Self
  where
    F: Future<Output = Result<LoadSummary>> + Send + 'static,
  {
    Self { name, task: task.boxed() }
  }
}

struct Spawned {
  name:   &'static str,
  rx:     oneshot::Receiver<LoadStatus>,
  handle: JoinHandle<()>,
}

fn spawn(worker: Worker) -> Spawned {
  let (tx, rx) = oneshot::channel();
  let Worker { name, task } = worker;

  let handle = tokio::spawn(async move {
    let status = match task.await {
      Ok(summary) => LoadStatus::Success(summary),
      Err(e) => LoadStatus::Failure(e.to_string()),
    };
    // The orchestrator may already have given up on us.
    let _ = tx.send(status);
  });

  Spawned { name, rx, handle }
}

/// Run `workers` concurrently and wait for all of them, at most `wait`.
///
/// Reports come back in spawn order, one per worker.
pub async fn run_phase(phase: Phase, workers: Vec<Worker>, wait: Duration) -> PhaseReport {
  let deadline = Instant::now() + wait;
  info!(%phase, workers = workers.len(), "phase started");

  let spawned: Vec<Spawned> = workers.into_iter().map(spawn).collect();

  // ── Fan-in: one completion message per worker ──────────────────────────
  let mut reports = Vec::with_capacity(spawned.len());
  let mut handles = Vec::with_capacity(spawned.len());
  for Spawned { name, rx, handle } in spawned {
    let status = match timeout_at(deadline, rx).await {
      Ok(Ok(status)) => status,
      Ok(Err(_)) => LoadStatus::Failure("worker exited without reporting".into()),
      Err(_) => LoadStatus::Failure(format!("no completion within {wait:?}")),
    };
    reports.push(WorkerReport { loader: name.to_owned(), status });
    handles.push(handle);
  }

  // ── Barrier: every task must terminate ───────────────────────────────────
  for (report, mut handle) in reports.iter_mut().zip(handles) {
    let failure = match timeout_at(deadline, &mut handle).await {
      Ok(Ok(())) => None,
      Ok(Err(e)) => Some(format!("worker task failed: {e}")),
      Err(_) => {
        handle.abort();
        Some(format!("worker did not terminate within {wait:?}"))
      }
    };
    if let Some(detail) = failure
      && report.status.is_success()
    {
      report.status = LoadStatus::Failure(detail);
    }
  }

  for report in &reports {
    match &report.status {
      LoadStatus::Success(s) => info!(
        %phase,
        loader = %report.loader,
        rows = s.inserted,
        dropped = s.dropped,
        "{report}"
      ),
      LoadStatus::Failure(_) => error!(%phase, loader = %report.loader, "{report}"),
    }
  }

  PhaseReport { phase, workers: reports }
}
