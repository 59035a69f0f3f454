//! Response contract for stress analysis replies.
//!
//! The schema below is handed to the oracle as a generation constraint and is the
//! single description of what a valid reply looks like. The types in this module are
//! what a reply becomes once `analysis::validate_reply` has accepted it.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Closed set of severity tiers, ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub const ALL: [StressLevel; 3] = [StressLevel::Low, StressLevel::Medium, StressLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "low",
            StressLevel::Medium => "medium",
            StressLevel::High => "high",
        }
    }

    /// Parse the exact wire literal. No trimming or case folding: anything else is
    /// outside the enumeration.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == raw)
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A phrase the oracle flagged as contributing to stress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressfulKeyword {
    #[serde(rename = "word")]
    pub phrase: String,
    /// Documented range is 1..=10; kept as received.
    pub intensity: i64,
}

impl StressfulKeyword {
    pub fn new(phrase: impl Into<String>, intensity: i64) -> Self {
        Self {
            phrase: phrase.into(),
            intensity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningScores {
    /// 0..=100
    pub negative_word_score: i64,
    /// -100..=100
    pub emotional_tone: i64,
    /// 0..=100
    pub cognitive_overload_index: i64,
}

/// A validated analysis. Built once per successful call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "stressLevel")]
    pub level: StressLevel,
    pub confidence: i64,
    pub explanation: String,
    #[serde(rename = "stressfulKeywords")]
    pub keywords: Vec<StressfulKeyword>,
    pub suggestions: Vec<String>,
    pub reasoning: ReasoningScores,
}

/// Languages the oracle is asked to auto-detect among.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Hindi,
    Spanish,
    French,
    German,
}

impl Language {
    pub const SUPPORTED: [Language; 5] = [
        Language::English,
        Language::Hindi,
        Language::Spanish,
        Language::French,
        Language::German,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
        }
    }

    /// Accepts the English name or the ISO 639-1 code, case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        let code = tag.split(['-', '_']).next().unwrap_or_default();
        match code {
            "en" | "english" => Some(Language::English),
            "hi" | "hindi" => Some(Language::Hindi),
            "es" | "spanish" => Some(Language::Spanish),
            "fr" | "french" => Some(Language::French),
            "de" | "german" => Some(Language::German),
            _ => None,
        }
    }
}

/// Wire field names shared by the schema and the validator.
pub mod fields {
    pub const LEVEL: &str = "stressLevel";
    pub const CONFIDENCE: &str = "confidence";
    pub const EXPLANATION: &str = "explanation";
    pub const KEYWORDS: &str = "stressfulKeywords";
    pub const PHRASE: &str = "word";
    pub const INTENSITY: &str = "intensity";
    pub const SUGGESTIONS: &str = "suggestions";
    pub const REASONING: &str = "reasoning";
    pub const NEGATIVE_WORD_SCORE: &str = "negativeWordScore";
    pub const EMOTIONAL_TONE: &str = "emotionalTone";
    pub const COGNITIVE_OVERLOAD: &str = "cognitiveOverloadIndex";

    pub const REASONING_FIELDS: [&str; 3] =
        [NEGATIVE_WORD_SCORE, EMOTIONAL_TONE, COGNITIVE_OVERLOAD];
}

pub struct ResponseContract;

impl ResponseContract {
    pub const MIME_TYPE: &'static str = "application/json";

    /// Output constraint in the oracle's OpenAPI-subset schema dialect.
    pub fn schema() -> Value {
        let levels: Vec<&str> = StressLevel::ALL.iter().map(StressLevel::as_str).collect();
        json!({
            "type": "OBJECT",
            "properties": {
                "stressLevel": {
                    "type": "STRING",
                    "enum": levels,
                    "description": "Overall stress classification"
                },
                "confidence": {
                    "type": "INTEGER",
                    "minimum": 0,
                    "maximum": 100,
                    "description": "Confidence in the classification, as a percentage"
                },
                "explanation": {
                    "type": "STRING",
                    "description": "Short justification of the classification"
                },
                "stressfulKeywords": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "word": {
                                "type": "STRING",
                                "description": "Word or phrase copied verbatim from the input"
                            },
                            "intensity": {
                                "type": "INTEGER",
                                "minimum": 1,
                                "maximum": 10
                            }
                        },
                        "required": [fields::PHRASE, fields::INTENSITY]
                    }
                },
                "suggestions": {
                    "type": "ARRAY",
                    "items": {"type": "STRING"},
                    "description": "Coping suggestions; must be non-empty when stressLevel is high"
                },
                "reasoning": {
                    "type": "OBJECT",
                    "properties": {
                        "negativeWordScore": {"type": "INTEGER", "minimum": 0, "maximum": 100},
                        "emotionalTone": {"type": "INTEGER", "minimum": -100, "maximum": 100},
                        "cognitiveOverloadIndex": {"type": "INTEGER", "minimum": 0, "maximum": 100}
                    },
                    "required": fields::REASONING_FIELDS
                }
            },
            "required": [
                fields::LEVEL,
                fields::CONFIDENCE,
                fields::EXPLANATION,
                fields::KEYWORDS,
                fields::SUGGESTIONS,
                fields::REASONING
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_level_enum_matches_stress_levels() {
        let schema = ResponseContract::schema();
        let levels = schema["properties"][fields::LEVEL]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(levels, vec!["low", "medium", "high"]);
    }

    #[test]
    fn schema_requires_every_top_level_field() {
        let schema = ResponseContract::schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert!(required.iter().any(|v| v == fields::REASONING));
        assert_eq!(
            schema["properties"][fields::REASONING]["required"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn serialized_result_uses_contract_field_names() {
        let result = AnalysisResult {
            level: StressLevel::Medium,
            confidence: 70,
            explanation: "Deadline pressure".into(),
            keywords: vec![StressfulKeyword::new("deadline", 6)],
            suggestions: vec![],
            reasoning: ReasoningScores {
                negative_word_score: 40,
                emotional_tone: -20,
                cognitive_overload_index: 55,
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        let schema = ResponseContract::schema();
        for key in schema["required"].as_array().unwrap() {
            assert!(value.get(key.as_str().unwrap()).is_some(), "missing {key}");
        }
        assert_eq!(value[fields::KEYWORDS][0][fields::PHRASE], "deadline");
        for key in fields::REASONING_FIELDS {
            assert!(value[fields::REASONING].get(key).is_some());
        }
    }

    #[test]
    fn level_parse_is_literal() {
        assert_eq!(StressLevel::parse("high"), Some(StressLevel::High));
        assert_eq!(StressLevel::parse("High"), None);
        assert_eq!(StressLevel::parse(" low"), None);
        assert_eq!(StressLevel::parse("extreme"), None);
        assert!(StressLevel::Low < StressLevel::High);
    }

    #[test]
    fn language_tags() {
        assert_eq!(Language::from_tag("en-US"), Some(Language::English));
        assert_eq!(Language::from_tag("Hindi"), Some(Language::Hindi));
        assert_eq!(Language::from_tag("ja"), None);
    }
}
