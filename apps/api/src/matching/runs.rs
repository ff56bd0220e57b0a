//! In-memory registry of background match runs, polled by run id.
//! Nothing here outlives the process.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::matching::models::{
    CandidateInput, PipelineError, RankedResultSet, RunProgress, RunState, TopK,
};
use crate::matching::pipeline::MatchPipeline;

/// Completed runs beyond this count are evicted, oldest first. Once every slot
/// holds a run still in progress, new runs are refused.
pub const MAX_TRACKED_RUNS: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error(transparent)]
    Rejected(#[from] PipelineError),

    #[error("{limit} match runs are already in progress, retry once one completes")]
    AtCapacity { limit: usize },
}

struct TrackedRun {
    progress: watch::Receiver<RunProgress>,
    results: Option<RankedResultSet>,
    created_at: DateTime<Utc>,
}

/// Point-in-time view of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub run_id: Uuid,
    pub state: RunState,
    pub processed: usize,
    pub total: usize,
    pub created_at: DateTime<Utc>,
    pub results: Option<RankedResultSet>,
}

#[derive(Clone)]
pub struct RunRegistry {
    runs: Arc<RwLock<HashMap<Uuid, TrackedRun>>>,
    capacity: usize,
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRACKED_RUNS)
    }

    /// Registry tracking at most `capacity` runs (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    /// Validates the request, then scores it on a background task.
    /// Returns the id to poll with `snapshot`.
    pub async fn start(
        &self,
        pipeline: Arc<MatchPipeline>,
        job_description: String,
        candidates: Vec<CandidateInput>,
        top_k: TopK,
    ) -> Result<Uuid, RunError> {
        MatchPipeline::check_preconditions(&job_description, &candidates)?;

        let run_id = Uuid::new_v4();
        let (progress_tx, progress_rx) = watch::channel(RunProgress {
            total: candidates.len(),
            ..RunProgress::default()
        });

        {
            let mut runs = self.runs.write().await;
            evict_completed(&mut runs, self.capacity - 1);
            if runs.len() >= self.capacity {
                warn!("Refusing match run: {} runs still in progress", runs.len());
                return Err(RunError::AtCapacity {
                    limit: self.capacity,
                });
            }
            runs.insert(
                run_id,
                TrackedRun {
                    progress: progress_rx,
                    results: None,
                    created_at: Utc::now(),
                },
            );
        }
        info!("Started match run {run_id} for {} resumes", candidates.len());

        let registry = self.clone();
        tokio::spawn(async move {
            let outcome = pipeline
                .run_with_progress(&job_description, candidates, top_k, &progress_tx)
                .await;
            registry.finish(run_id, outcome).await;
        });

        Ok(run_id)
    }

    pub async fn snapshot(&self, run_id: Uuid) -> Option<RunSnapshot> {
        let runs = self.runs.read().await;
        let run = runs.get(&run_id)?;
        let progress = *run.progress.borrow();
        // The pipeline publishes Completed before `finish` stores the results.
        let state = match (progress.state, &run.results) {
            (RunState::Completed, None) => RunState::Running,
            (state, _) => state,
        };
        Some(RunSnapshot {
            run_id,
            state,
            processed: progress.processed,
            total: progress.total,
            created_at: run.created_at,
            results: run.results.clone(),
        })
    }

    #[cfg(test)]
    pub async fn tracked_count(&self) -> usize {
        self.runs.read().await.len()
    }

    async fn finish(&self, run_id: Uuid, outcome: Result<RankedResultSet, PipelineError>) {
        match outcome {
            Ok(results) => {
                if let Some(run) = self.runs.write().await.get_mut(&run_id) {
                    run.results = Some(results);
                }
                info!("Match run {run_id} completed");
            }
            // Preconditions were checked before spawning.
            Err(e) => {
                error!("Match run {run_id} rejected after start: {e}");
                self.runs.write().await.remove(&run_id);
            }
        }
    }
}

/// Drops the oldest completed runs until at most `keep` remain.
fn evict_completed(runs: &mut HashMap<Uuid, TrackedRun>, keep: usize) {
    while runs.len() > keep {
        let oldest = runs
            .iter()
            .filter(|(_, run)| run.results.is_some())
            .min_by_key(|(_, run)| run.created_at)
            .map(|(id, _)| *id);
        match oldest {
            Some(id) => {
                runs.remove(&id);
            }
            None => break,
        }
    }
}
