//! Response interpretation: turns the oracle's raw reply into a `MatchResult`.
//!
//! The reply is only partially trusted: it may be wrapped in markdown fences,
//! carry a score as a float or a string, or not be JSON at all. Anything that
//! cannot be read becomes the fixed parse-degraded result; nothing here fails.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::matching::models::{Assessment, MatchResult};

pub const MIN_SCORE: u32 = 0;
pub const MAX_SCORE: u32 = 100;

const PARSE_DEGRADED_SCORE: u32 = 50;
const PARSE_DEGRADED_REASONING: &str =
    "Unable to fully analyze this resume, but basic matching suggests moderate fit.";
const PARSE_DEGRADED_STRENGTH: &str = "Resume uploaded successfully";
const PARSE_DEGRADED_CONCERN: &str = "Analysis incomplete";

/// Structured fields read from a well-formed oracle reply.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleAssessment {
    pub score: u32,
    pub reasoning: String,
    pub key_strengths: Vec<String>,
    pub concerns: Vec<String>,
}

impl OracleAssessment {
    pub fn into_result(self, identifier: &str) -> MatchResult {
        MatchResult {
            identifier: identifier.to_string(),
            score: self.score,
            reasoning: self.reasoning,
            key_strengths: self.key_strengths,
            concerns: self.concerns,
            assessment: Assessment::Oracle,
            extraction_degraded: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("reply has no usable '{0}' field")]
    MissingField(&'static str),
}

/// Parses a raw oracle reply. Scores outside 0–100 are clamped.
pub fn parse_assessment(raw: &str) -> Result<OracleAssessment, InterpretError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned)?;
    let object = value.as_object().ok_or(InterpretError::NotAnObject)?;

    let raw_score = object
        .get("score")
        .and_then(coerce_score)
        .ok_or(InterpretError::MissingField("score"))?;

    let reasoning = object
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(InterpretError::MissingField("reasoning"))?
        .to_string();

    Ok(OracleAssessment {
        score: clamp_score(raw_score),
        reasoning,
        key_strengths: string_list(object.get("key_strengths")),
        concerns: string_list(object.get("concerns")),
    })
}

/// The fixed result used when a reply arrived but could not be read.
pub fn parse_degraded_result(identifier: &str) -> MatchResult {
    MatchResult {
        identifier: identifier.to_string(),
        score: PARSE_DEGRADED_SCORE,
        reasoning: PARSE_DEGRADED_REASONING.to_string(),
        key_strengths: vec![PARSE_DEGRADED_STRENGTH.to_string()],
        concerns: vec![PARSE_DEGRADED_CONCERN.to_string()],
        assessment: Assessment::ParseDegraded,
        extraction_degraded: false,
    }
}

/// Strips ```json ... ``` (or any other language tag) fences from LLM output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        .trim_start();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim().trim_end_matches('%').trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    }
}

fn clamp_score(raw: i64) -> u32 {
    let clamped = raw.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE));
    if clamped != raw {
        warn!("Oracle score {raw} outside {MIN_SCORE}-{MAX_SCORE}, clamped to {clamped}");
    }
    clamped as u32
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
