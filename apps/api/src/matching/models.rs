use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// One submitted resume: display name plus the raw uploaded bytes.
/// Moved into the pipeline and consumed once per run.
#[derive(Debug, Clone)]
pub struct CandidateInput {
    pub identifier: String,
    pub content: Bytes,
}

impl CandidateInput {
    pub fn new(identifier: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            identifier: identifier.into(),
            content: content.into(),
        }
    }
}

/// Plain text derived from a `CandidateInput`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateText {
    Extracted(String),
    /// Decoding failed; the identifier stands in as the text body.
    Degraded { identifier: String },
}

impl CandidateText {
    pub fn as_str(&self) -> &str {
        match self {
            CandidateText::Extracted(text) => text,
            CandidateText::Degraded { identifier } => identifier,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CandidateText::Degraded { .. })
    }
}

const DEFAULT_TOP_K: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(k) => k,
    None => panic!("default top_k must be non-zero"),
};

/// How many ranked results to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopK {
    All,
    Limit(NonZeroUsize),
}

impl Default for TopK {
    fn default() -> Self {
        TopK::Limit(DEFAULT_TOP_K)
    }
}

impl TopK {
    pub fn limit(k: usize) -> Option<Self> {
        NonZeroUsize::new(k).map(TopK::Limit)
    }

    pub(crate) fn truncate<T>(self, items: &mut Vec<T>) {
        if let TopK::Limit(k) = self {
            items.truncate(k.get());
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("top_k must be a positive integer or \"all\", got '{0}'")]
pub struct InvalidTopK(pub String);

impl FromStr for TopK {
    type Err = InvalidTopK;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(TopK::All);
        }
        trimmed
            .parse::<usize>()
            .ok()
            .and_then(TopK::limit)
            .ok_or_else(|| InvalidTopK(s.to_string()))
    }
}

impl fmt::Display for TopK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopK::All => f.write_str("all"),
            TopK::Limit(k) => write!(f, "{k}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

/// Which path produced a `MatchResult`. Everything except `Oracle` is degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    Oracle,
    ParseDegraded,
    ServiceUnavailable,
    TransportFailure,
}

impl Assessment {
    pub fn is_degraded(self) -> bool {
        self != Assessment::Oracle
    }
}

/// Fit assessment for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub identifier: String,
    pub score: u32, // 0 – 100
    pub reasoning: String,
    pub key_strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub assessment: Assessment,
    /// Set when the resume could not be decoded and the identifier was scored instead.
    pub extraction_degraded: bool,
}

impl MatchResult {
    pub fn label(&self) -> &'static str {
        score_label(self.score)
    }
}

// Serialized with the derived `label` alongside the stored fields.
impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MatchResult", 8)?;
        state.serialize_field("identifier", &self.identifier)?;
        state.serialize_field("score", &self.score)?;
        state.serialize_field("label", self.label())?;
        state.serialize_field("reasoning", &self.reasoning)?;
        state.serialize_field("key_strengths", &self.key_strengths)?;
        state.serialize_field("concerns", &self.concerns)?;
        state.serialize_field("assessment", &self.assessment)?;
        state.serialize_field("extraction_degraded", &self.extraction_degraded)?;
        state.end()
    }
}

/// Human-facing band for a score.
pub fn score_label(score: u32) -> &'static str {
    if score >= 80 {
        "Excellent Match"
    } else if score >= 60 {
        "Good Match"
    } else if score >= 40 {
        "Fair Match"
    } else {
        "Needs Support"
    }
}

/// Results of one run: score descending, ties in submission order, cut to top-K.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResultSet {
    pub results: Vec<MatchResult>,
    /// Number of candidates scored before truncation.
    pub total_candidates: usize,
    pub top_k: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Run state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Snapshot published on the run's progress channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunProgress {
    pub state: RunState,
    pub processed: usize,
    pub total: usize,
}

/// Rejected before a run starts. Never produced for a single candidate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("job description cannot be empty")]
    EmptyJobDescription,

    #[error("at least one resume is required")]
    NoCandidates,
}
