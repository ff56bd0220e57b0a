//! Match pipeline: scores every resume against one job description and ranks them.
//!
//! Flow per candidate: extract text → one oracle call → interpret reply, with a
//! fallback result substituted wherever a step fails. Every candidate yields exactly
//! one result; only the run preconditions can fail the whole run.
//!
//! Run state moves Idle → Running → Completed on the caller's progress channel.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::matching::extract::{extract_text, TextExtractor, Utf8TextExtractor};
use crate::matching::fallback::FallbackScorer;
use crate::matching::interpret::{parse_assessment, parse_degraded_result, OracleAssessment};
use crate::matching::models::{
    CandidateInput, CandidateText, MatchResult, PipelineError, RankedResultSet, RunProgress,
    RunState, TopK,
};
use crate::matching::oracle::{FitOracle, OracleError};

/// What happened when one candidate was put to the oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Assessed(OracleAssessment),
    /// A reply arrived but could not be read.
    ParseDegraded,
    /// The oracle answered with an error status.
    ServiceUnavailable,
    /// The oracle could not be reached or sent nothing back.
    TransportFailure,
}

#[derive(Clone)]
pub struct MatchPipeline {
    oracle: Arc<dyn FitOracle>,
    extractor: Arc<dyn TextExtractor>,
    fallback: FallbackScorer,
    concurrency: usize,
}

impl MatchPipeline {
    pub fn new(oracle: Arc<dyn FitOracle>) -> Self {
        Self {
            oracle,
            extractor: Arc::new(Utf8TextExtractor),
            fallback: FallbackScorer::default(),
            concurrency: 1,
        }
    }

    #[cfg(test)]
    pub fn with_fallback(mut self, fallback: FallbackScorer) -> Self {
        self.fallback = fallback;
        self
    }

    /// Maximum oracle calls in flight at once. 1 (the default) scores sequentially.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs the pipeline without publishing progress.
    pub async fn run(
        &self,
        job_description: &str,
        candidates: Vec<CandidateInput>,
        top_k: TopK,
    ) -> Result<RankedResultSet, PipelineError> {
        let (progress, _) = watch::channel(RunProgress::default());
        self.run_with_progress(job_description, candidates, top_k, &progress)
            .await
    }

    /// Runs the pipeline, publishing state and per-candidate progress on `progress`.
    ///
    /// Preconditions are checked before the state leaves `Idle`. Dropping the returned
    /// future abandons any oracle calls still in flight.
    pub async fn run_with_progress(
        &self,
        job_description: &str,
        candidates: Vec<CandidateInput>,
        top_k: TopK,
        progress: &watch::Sender<RunProgress>,
    ) -> Result<RankedResultSet, PipelineError> {
        Self::check_preconditions(job_description, &candidates)?;

        let total = candidates.len();
        let started_at = Utc::now();
        progress.send_replace(RunProgress {
            state: RunState::Running,
            processed: 0,
            total,
        });
        info!("Scoring {total} resumes (top_k={top_k}, concurrency={})", self.concurrency);

        // Collected first so the spawned run future stays `Send`. The futures are
        // lazy; `buffered` polls at most `concurrency` of them and yields in
        // submission order whatever order calls finish in.
        let pending: Vec<_> = candidates
            .iter()
            .map(|candidate| self.evaluate(job_description, candidate))
            .collect();
        let mut evaluations = stream::iter(pending).buffered(self.concurrency);

        let mut results = Vec::with_capacity(total);
        while let Some(result) = evaluations.next().await {
            results.push(result);
            let processed = results.len();
            progress.send_modify(|p| p.processed = processed);
        }

        let degraded = results
            .iter()
            .filter(|r| r.assessment.is_degraded())
            .count();
        rank(&mut results, top_k);

        progress.send_replace(RunProgress {
            state: RunState::Completed,
            processed: total,
            total,
        });
        info!(
            "Scored {total} resumes ({degraded} degraded), returning {}",
            results.len()
        );

        Ok(RankedResultSet {
            results,
            total_candidates: total,
            top_k: top_k.to_string(),
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Rejects a run that must not start: blank job description or no resumes.
    pub fn check_preconditions(
        job_description: &str,
        candidates: &[CandidateInput],
    ) -> Result<(), PipelineError> {
        if job_description.trim().is_empty() {
            return Err(PipelineError::EmptyJobDescription);
        }
        if candidates.is_empty() {
            return Err(PipelineError::NoCandidates);
        }
        Ok(())
    }

    async fn evaluate(&self, job_description: &str, candidate: &CandidateInput) -> MatchResult {
        let text = extract_text(self.extractor.as_ref(), candidate);
        let outcome = self
            .consult(job_description, &candidate.identifier, &text)
            .await;
        let mut result = self.resolve(&candidate.identifier, outcome);
        result.extraction_degraded = text.is_degraded();
        result
    }

    async fn consult(
        &self,
        job_description: &str,
        identifier: &str,
        text: &CandidateText,
    ) -> CandidateOutcome {
        match self.oracle.assess(job_description, text).await {
            Ok(raw) => match parse_assessment(&raw) {
                Ok(assessment) => CandidateOutcome::Assessed(assessment),
                Err(e) => {
                    warn!("Unreadable oracle reply for {identifier}: {e}");
                    CandidateOutcome::ParseDegraded
                }
            },
            Err(e @ OracleError::Unavailable { .. }) => {
                warn!("Oracle unavailable for {identifier}: {e}");
                CandidateOutcome::ServiceUnavailable
            }
            Err(e @ (OracleError::Transport(_) | OracleError::EmptyPayload)) => {
                warn!("Oracle call failed for {identifier}: {e}");
                CandidateOutcome::TransportFailure
            }
        }
    }

    fn resolve(&self, identifier: &str, outcome: CandidateOutcome) -> MatchResult {
        match outcome {
            CandidateOutcome::Assessed(assessment) => assessment.into_result(identifier),
            CandidateOutcome::ParseDegraded => parse_degraded_result(identifier),
            CandidateOutcome::ServiceUnavailable => self.fallback.service_unavailable(identifier),
            CandidateOutcome::TransportFailure => self.fallback.transport_failure(identifier),
        }
    }
}

/// Sorts by score descending and truncates. The sort is stable, so equal scores
/// keep submission order.
pub fn rank(results: &mut Vec<MatchResult>, top_k: TopK) {
    results.sort_by(|a, b| b.score.cmp(&a.score));
    top_k.truncate(results);
}
