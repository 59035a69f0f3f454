use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stress_lens::clients::{OracleError, OracleRequest, StructuredOracle};
use stress_lens::{AnalysisError, AnalysisOrchestrator, Language, StressLevel, TrendTracker, highlight};

/// Replays one canned reply and counts calls.
struct ScriptedOracle {
    reply: Result<String, fn() -> OracleError>,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<Option<String>>,
}

impl ScriptedOracle {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    fn failing(err: fn() -> OracleError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredOracle for ScriptedOracle {
    async fn generate(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

const HIGH_REPLY: &str = r#"{
  "stressLevel": "high",
  "confidence": 91,
  "explanation": "Deadlines and lost sleep dominate the text.",
  "stressfulKeywords": [
    {"word": "deadline", "intensity": 8},
    {"word": "can't sleep", "intensity": 9}
  ],
  "suggestions": ["Break the work into smaller pieces", "Protect a fixed bedtime"],
  "reasoning": {"negativeWordScore": 72, "emotionalTone": -65, "cognitiveOverloadIndex": 84}
}"#;

fn orchestrator(oracle: &Arc<ScriptedOracle>) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(oracle.clone())
}

#[tokio::test]
async fn valid_reply_flows_through_highlighting_and_trend() {
    let oracle = ScriptedOracle::replying(HIGH_REPLY);
    let text = "Another deadline tomorrow and I can't sleep.";

    let result = orchestrator(&oracle).analyze(text).await.unwrap();
    assert_eq!(oracle.calls(), 1);
    assert_eq!(result.level, StressLevel::High);
    assert_eq!(result.confidence, 91);
    assert_eq!(result.reasoning.emotional_tone, -65);
    assert_eq!(result.suggestions.len(), 2);

    let segments = highlight(text, &result.keywords);
    let matched: Vec<&str> = segments.iter().filter(|s| s.is_match()).map(|s| s.text).collect();
    assert_eq!(matched, vec!["deadline", "can't sleep"]);
    assert_eq!(segments.iter().map(|s| s.text).collect::<String>(), text);

    let mut trend = TrendTracker::new();
    trend.append(result.level);
    assert_eq!(trend.snapshot(), [None, None, None, None, Some(StressLevel::High)]);
}

#[tokio::test]
async fn blank_input_never_reaches_the_oracle() {
    let oracle = ScriptedOracle::replying(HIGH_REPLY);
    for text in ["", "   ", "\n\t "] {
        let err = orchestrator(&oracle).analyze(text).await.unwrap_err();
        assert_eq!(err, AnalysisError::EmptyInput);
    }
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn transport_failure_is_not_retried() {
    let oracle = ScriptedOracle::failing(|| OracleError::Transport("connection reset".into()));
    let err = orchestrator(&oracle).analyze("I am fine").await.unwrap_err();
    assert_eq!(err.kind(), "oracle_unavailable");
    assert_eq!(err.user_message(), "analysis failed");
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn status_failure_maps_to_unavailable() {
    let oracle = ScriptedOracle::failing(|| OracleError::Status {
        status: 503,
        body: "overloaded".into(),
    });
    let err = orchestrator(&oracle).analyze("text").await.unwrap_err();
    assert!(matches!(err, AnalysisError::OracleUnavailable { .. }));
}

#[tokio::test]
async fn empty_reply_is_malformed() {
    let oracle = ScriptedOracle::failing(|| OracleError::EmptyReply);
    let err = orchestrator(&oracle).analyze("text").await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedReply { .. }));
}

#[tokio::test]
async fn out_of_vocabulary_level_is_rejected() {
    let reply = HIGH_REPLY.replace("\"high\"", "\"extreme\"");
    let oracle = ScriptedOracle::replying(&reply);
    let err = orchestrator(&oracle).analyze("text").await.unwrap_err();
    assert_eq!(
        err,
        AnalysisError::InvalidClassification {
            value: "extreme".into()
        }
    );
}

#[tokio::test]
async fn missing_reasoning_is_rejected() {
    let reply = r#"{"stressLevel":"low","confidence":40,"explanation":"calm",
        "stressfulKeywords":[],"suggestions":[]}"#;
    let oracle = ScriptedOracle::replying(reply);
    let err = orchestrator(&oracle).analyze("text").await.unwrap_err();
    assert_eq!(err.kind(), "missing_reasoning");
}

#[tokio::test]
async fn non_json_reply_is_malformed() {
    let oracle = ScriptedOracle::replying("Sure! Here is the analysis: high stress.");
    let err = orchestrator(&oracle).analyze("text").await.unwrap_err();
    assert_eq!(err.kind(), "malformed_reply");
}

#[tokio::test]
async fn failures_leave_the_trend_untouched() {
    let good = ScriptedOracle::replying(HIGH_REPLY);
    let bad = ScriptedOracle::replying("not json");
    let mut trend = TrendTracker::new();

    for oracle in [&good, &bad, &bad, &good] {
        if let Ok(result) = orchestrator(oracle).analyze("deadline").await {
            trend.append(result.level);
        }
    }
    assert_eq!(trend.len(), 2);
    assert_eq!(
        trend.snapshot(),
        [None, None, None, Some(StressLevel::High), Some(StressLevel::High)]
    );
}

#[tokio::test]
async fn language_hint_reaches_the_prompt() {
    let oracle = ScriptedOracle::replying(HIGH_REPLY);
    orchestrator(&oracle)
        .analyze_with_language("मुझे बहुत तनाव है", Some(Language::Hindi))
        .await
        .unwrap();
    let prompt = oracle.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("Hindi"));
    assert!(prompt.contains("मुझे बहुत तनाव है"));
}
