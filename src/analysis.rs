//! Analysis orchestration: one oracle call per request, then shape validation.
//!
//! The oracle is an untrusted producer. Its reply is parsed as loose JSON and checked
//! field by field against the response contract; nothing is clamped or rewritten.
//! Range limits in the contract are instructions to the oracle, not runtime gates.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::traits::{OracleError, OracleRequest, StructuredOracle};
use crate::contract::{
    AnalysisResult, Language, ReasoningScores, ResponseContract, StressLevel, StressfulKeyword,
    fields,
};
use crate::error::AnalysisError;
use crate::prompts::analysis_prompt;

/// Stateless front door to the oracle. Safe to share across tasks.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    oracle: Arc<dyn StructuredOracle>,
}

impl AnalysisOrchestrator {
    pub fn new(oracle: Arc<dyn StructuredOracle>) -> Self {
        Self { oracle }
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_with_language(text, None).await
    }

    /// Analyze `text`, forwarding `hint` to the oracle. No retries: a failure is
    /// returned to the caller as-is.
    pub async fn analyze_with_language(
        &self,
        text: &str,
        hint: Option<Language>,
    ) -> Result<AnalysisResult, AnalysisError> {
        if text.trim().is_empty() {
            tracing::debug!("rejecting empty analysis input");
            return Err(AnalysisError::EmptyInput);
        }

        let request = build_request(text, hint);
        tracing::info!(
            chars = text.chars().count(),
            language_hint = hint.map(|l| l.name()).unwrap_or("none"),
            "dispatching analysis request"
        );
        tracing::debug!("analysis input: {}", text);

        let outcome = match self.oracle.generate(&request).await {
            Ok(raw) => validate_reply(&raw),
            Err(err) => Err(map_oracle_error(err)),
        };

        match &outcome {
            Ok(result) => tracing::info!(
                stress_level = %result.level,
                confidence = result.confidence,
                keywords = result.keywords.len(),
                "analysis complete"
            ),
            Err(err) => tracing::warn!(kind = err.kind(), "analysis failed: {}", err),
        }
        outcome
    }
}

/// Request embedding the instructions, the input, and the response contract.
pub fn build_request(text: &str, hint: Option<Language>) -> OracleRequest {
    OracleRequest {
        prompt: analysis_prompt(text, hint),
        response_schema: ResponseContract::schema(),
        mime_type: ResponseContract::MIME_TYPE,
    }
}

fn map_oracle_error(err: OracleError) -> AnalysisError {
    match err {
        OracleError::EmptyReply => AnalysisError::malformed("oracle reply contained no text"),
        other => AnalysisError::OracleUnavailable {
            message: other.to_string(),
        },
    }
}

/// Validate a raw oracle reply against the response contract.
///
/// Checks run in a fixed order and stop at the first failure: well-formed JSON,
/// classification literal, reasoning block, then the remaining fields' presence and
/// types.
pub fn validate_reply(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| AnalysisError::malformed(format!("reply is not valid JSON: {}", e)))?;
    let obj = value
        .as_object()
        .ok_or_else(|| AnalysisError::malformed("reply is not a JSON object"))?;

    let level = parse_level(obj)?;
    let reasoning = parse_reasoning(obj)?;

    let confidence = require_int(obj, fields::CONFIDENCE)?;
    let explanation = obj
        .get(fields::EXPLANATION)
        .and_then(Value::as_str)
        .ok_or_else(|| wrong_type(fields::EXPLANATION, "a string"))?
        .to_string();
    let keywords = parse_keywords(obj)?;
    let suggestions = parse_suggestions(obj)?;

    if level == StressLevel::High && suggestions.is_empty() {
        tracing::debug!("high classification arrived without suggestions");
    }

    Ok(AnalysisResult {
        level,
        confidence,
        explanation,
        keywords,
        suggestions,
        reasoning,
    })
}

fn parse_level(obj: &Map<String, Value>) -> Result<StressLevel, AnalysisError> {
    match obj.get(fields::LEVEL) {
        Some(Value::String(raw)) => {
            StressLevel::parse(raw).ok_or_else(|| AnalysisError::InvalidClassification {
                value: raw.clone(),
            })
        }
        Some(other) => Err(AnalysisError::InvalidClassification {
            value: other.to_string(),
        }),
        None => Err(AnalysisError::InvalidClassification {
            value: "<missing>".to_string(),
        }),
    }
}

fn parse_reasoning(obj: &Map<String, Value>) -> Result<ReasoningScores, AnalysisError> {
    let reasoning = obj
        .get(fields::REASONING)
        .and_then(Value::as_object)
        .ok_or_else(|| AnalysisError::MissingReasoning {
            message: format!("`{}` object is absent", fields::REASONING),
        })?;

    let score = |name: &str| {
        reasoning
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| AnalysisError::MissingReasoning {
                message: format!("`{}` is missing or not an integer", name),
            })
    };

    Ok(ReasoningScores {
        negative_word_score: score(fields::NEGATIVE_WORD_SCORE)?,
        emotional_tone: score(fields::EMOTIONAL_TONE)?,
        cognitive_overload_index: score(fields::COGNITIVE_OVERLOAD)?,
    })
}

fn parse_keywords(obj: &Map<String, Value>) -> Result<Vec<StressfulKeyword>, AnalysisError> {
    let items = obj
        .get(fields::KEYWORDS)
        .and_then(Value::as_array)
        .ok_or_else(|| wrong_type(fields::KEYWORDS, "an array"))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let entry = item.as_object().ok_or_else(|| {
                AnalysisError::malformed(format!("`{}[{}]` is not an object", fields::KEYWORDS, idx))
            })?;
            let phrase = entry
                .get(fields::PHRASE)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    AnalysisError::malformed(format!(
                        "`{}[{}].{}` is missing or not a string",
                        fields::KEYWORDS,
                        idx,
                        fields::PHRASE
                    ))
                })?;
            let intensity = entry
                .get(fields::INTENSITY)
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    AnalysisError::malformed(format!(
                        "`{}[{}].{}` is missing or not an integer",
                        fields::KEYWORDS,
                        idx,
                        fields::INTENSITY
                    ))
                })?;
            Ok(StressfulKeyword::new(phrase, intensity))
        })
        .collect()
}

fn parse_suggestions(obj: &Map<String, Value>) -> Result<Vec<String>, AnalysisError> {
    let items = obj
        .get(fields::SUGGESTIONS)
        .and_then(Value::as_array)
        .ok_or_else(|| wrong_type(fields::SUGGESTIONS, "an array"))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                AnalysisError::malformed(format!("`{}[{}]` is not a string", fields::SUGGESTIONS, idx))
            })
        })
        .collect()
}

fn require_int(obj: &Map<String, Value>, field: &str) -> Result<i64, AnalysisError> {
    obj.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| wrong_type(field, "an integer"))
}

fn wrong_type(field: &str, expected: &str) -> AnalysisError {
    AnalysisError::malformed(format!("`{}` is missing or not {}", field, expected))
}
