use std::sync::Arc;

use crate::config::Config;
use crate::matching::pipeline::MatchPipeline;
use crate::matching::runs::RunRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Scoring pipeline. Holds the oracle as `Arc<dyn FitOracle>` so tests can swap it.
    pub pipeline: Arc<MatchPipeline>,
    /// Background runs started via `POST /api/v1/runs`.
    pub runs: RunRegistry,
    pub config: Config,
}
