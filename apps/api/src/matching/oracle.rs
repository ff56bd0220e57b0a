//! Fit oracle: the external scoring call, one per candidate.
//!
//! `AppState` holds the pipeline, which holds an `Arc<dyn FitOracle>`; tests swap in
//! scripted oracles without touching the pipeline.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::matching::models::CandidateText;
use crate::matching::prompts::build_match_prompt;

/// Why an oracle call produced no reply.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Unreachable, timed out, or the reply envelope was unreadable.
    #[error("oracle unreachable: {0}")]
    Transport(String),

    /// Reachable, but answered with a non-success status.
    #[error("oracle returned status {status}: {message}")]
    Unavailable { status: u16, message: String },

    #[error("oracle returned an empty reply")]
    EmptyPayload,
}

impl From<LlmError> for OracleError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Http(e) => OracleError::Transport(e.to_string()),
            LlmError::Api { status, message } => OracleError::Unavailable { status, message },
            LlmError::EmptyContent => OracleError::EmptyPayload,
        }
    }
}

/// Produces a raw fit assessment for one resume against one job description.
/// Implementations make exactly one attempt and never retry.
#[async_trait]
pub trait FitOracle: Send + Sync {
    async fn assess(
        &self,
        job_description: &str,
        candidate: &CandidateText,
    ) -> Result<String, OracleError>;
}

/// Oracle backed by Claude via `LlmClient`.
pub struct LlmFitOracle(pub LlmClient);

#[async_trait]
impl FitOracle for LlmFitOracle {
    async fn assess(
        &self,
        job_description: &str,
        candidate: &CandidateText,
    ) -> Result<String, OracleError> {
        let prompt = build_match_prompt(job_description, candidate.as_str());
        debug!("Sending fit assessment prompt ({} chars)", prompt.len());
        Ok(self.0.complete(&prompt, JSON_ONLY_SYSTEM).await?)
    }
}
