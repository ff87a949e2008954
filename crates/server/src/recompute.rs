//! Background recompute control for the HTTP surface.
//!
//! At most one pass runs at a time. The controller keeps the latest status for
//! polling clients and forwards every pass event to the WebSocket broadcaster.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use hsorter_core::recompute::FIXED_STAGE_UNITS;
use hsorter_core::{
    CancelToken, RecomputeEvent, RecomputeStage, RecomputeSummary, StatsRecomputer,
};

use crate::api::WsBroadcaster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Latest known state of the recompute pass.
#[derive(Debug, Clone, Serialize)]
pub struct RecomputeStatus {
    pub state: RecomputeState,
    pub run_id: Option<Uuid>,
    pub stage: Option<RecomputeStage>,
    pub done: u64,
    pub total: u64,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RecomputeStatus {
    fn idle() -> Self {
        Self {
            state: RecomputeState::Idle,
            run_id: None,
            stage: None,
            done: 0,
            total: 0,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RecomputeState::Running
    }

    fn apply(&mut self, event: &RecomputeEvent) {
        match event {
            RecomputeEvent::Progress(progress) => {
                self.run_id = Some(progress.run_id);
                self.stage = Some(progress.stage);
                self.done = progress.done;
                self.total = progress.total;
            }
            RecomputeEvent::Completed(summary) => self.complete(summary),
            RecomputeEvent::Failed {
                run_id,
                stage,
                done,
                total,
                error,
            } => {
                self.state = RecomputeState::Failed;
                self.run_id = Some(*run_id);
                self.stage = *stage;
                self.done = *done;
                self.total = *total;
                self.error = Some(error.clone());
                self.finished_at.get_or_insert_with(Utc::now);
            }
        }
    }

    fn complete(&mut self, summary: &RecomputeSummary) {
        self.state = RecomputeState::Completed;
        self.run_id = Some(summary.run_id);
        self.done = self.total;
        self.error = None;
        self.started_at = Some(summary.started_at);
        self.finished_at = Some(summary.completed_at);
    }
}

struct Inner {
    status: RecomputeStatus,
    cancel: Option<CancelToken>,
    /// Bumped on every start so a finished pass never overwrites a newer one.
    generation: u64,
}

/// Starts, tracks and cancels recompute passes.
pub struct RecomputeController {
    recomputer: Arc<StatsRecomputer>,
    broadcaster: WsBroadcaster,
    inner: Arc<RwLock<Inner>>,
}

impl RecomputeController {
    pub fn new(recomputer: Arc<StatsRecomputer>, broadcaster: WsBroadcaster) -> Self {
        Self {
            recomputer,
            broadcaster,
            inner: Arc::new(RwLock::new(Inner {
                status: RecomputeStatus::idle(),
                cancel: None,
                generation: 0,
            })),
        }
    }

    /// Start a pass in the background.
    ///
    /// Returns `false` without doing anything if a pass is already running.
    pub async fn start(&self) -> bool {
        let cancel = CancelToken::new();
        let generation = {
            let mut inner = self.inner.write().await;
            if inner.status.is_running() {
                return false;
            }
            inner.generation += 1;
            inner.cancel = Some(cancel.clone());
            inner.status = RecomputeStatus {
                state: RecomputeState::Running,
                total: FIXED_STAGE_UNITS,
                started_at: Some(Utc::now()),
                ..RecomputeStatus::idle()
            };
            inner.generation
        };

        let (handle, mut events) = Arc::clone(&self.recomputer).spawn(cancel);
        let inner = Arc::clone(&self.inner);
        let broadcaster = self.broadcaster.clone();
        self.broadcaster.recompute_status(true);

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                broadcaster.recompute_event(&event);
                inner.write().await.status.apply(&event);
            }

            let outcome = handle.await;
            let mut guard = inner.write().await;
            if guard.generation != generation {
                return;
            }
            match outcome {
                Ok(Ok(summary)) => guard.status.complete(&summary),
                Ok(Err(failure)) => guard.status.apply(&failure.to_event()),
                Err(e) => {
                    error!("Recompute task aborted: {}", e);
                    guard.status.state = RecomputeState::Failed;
                    guard.status.error = Some(format!("recompute task aborted: {}", e));
                    guard.status.finished_at = Some(Utc::now());
                }
            }
            guard.cancel = None;
            drop(guard);
            broadcaster.recompute_status(false);
        });

        info!("Recompute pass started");
        true
    }

    /// Request cancellation of the running pass.
    ///
    /// Returns `false` if nothing is running.
    pub async fn cancel(&self) -> bool {
        let inner = self.inner.read().await;
        match (&inner.cancel, inner.status.is_running()) {
            (Some(token), true) => {
                token.cancel();
                info!("Recompute cancellation requested");
                true
            }
            _ => false,
        }
    }

    pub async fn status(&self) -> RecomputeStatus {
        self.inner.read().await.status.clone()
    }

    /// Wait until no pass is running.
    pub async fn wait_idle(&self) {
        while self.status().await.is_running() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}
