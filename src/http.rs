//! HTTP surface for stress-lens.
//!
//! Routes: `/health`, `/info`, `POST /analyze`, `GET /trend` and `POST /report`. The trend window is
//! process-local and only grows on successful analyses.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::analysis::AnalysisOrchestrator;
use crate::clients::{GeminiClient, StructuredOracle};
use crate::config::Config;
use crate::contract::{AnalysisResult, Language, StressLevel};
use crate::error::{Result, StressLensError};
use crate::highlight::{HighlightSegment, highlight};
use crate::report::ReportRenderer;
use crate::trend::{TREND_WINDOW, TrendTracker};

const REPORT_FILENAME: &str = "stress-report.pdf";

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub trend: Arc<Mutex<TrendTracker>>,
    pub renderer: Arc<ReportRenderer>,
}

impl HttpState {
    pub fn new(config: Arc<Config>, oracle: Arc<dyn StructuredOracle>) -> Self {
        let renderer = ReportRenderer::new(config.report.clone());
        Self {
            config,
            orchestrator: Arc::new(AnalysisOrchestrator::new(oracle)),
            trend: Arc::new(Mutex::new(TrendTracker::new())),
            renderer: Arc::new(renderer),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse<'a> {
    id: Uuid,
    result: &'a AnalysisResult,
    highlights: Vec<HighlightSegment<'a>>,
    trend: [Option<StressLevel>; TREND_WINDOW],
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub text: String,
    pub result: AnalysisResult,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Info endpoint
pub async fn info_handler(State(state): State<HttpState>) -> impl IntoResponse {
    let config = &state.config;
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "oracle": {
            "model": config.oracle.model,
            "timeout_ms": config.oracle.timeout_ms,
            "credentials": config.runtime.api_key.is_some(),
        },
        "report": {
            "page_width": config.report.page_width,
            "page_height": config.report.page_height,
        },
        "trend_window": TREND_WINDOW,
    }))
}

pub async fn analyze_handler(
    State(state): State<HttpState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Value>> {
    let hint = match request.language.as_deref() {
        Some(tag) => {
            let parsed = Language::from_tag(tag);
            if parsed.is_none() {
                tracing::debug!("ignoring unsupported language hint: {}", tag);
            }
            parsed
        }
        None => None,
    };

    let result = state
        .orchestrator
        .analyze_with_language(&request.text, hint)
        .await?;

    let trend = {
        let mut tracker = state.trend.lock().await;
        tracker.append(result.level);
        tracker.snapshot()
    };

    let response = AnalyzeResponse {
        id: Uuid::new_v4(),
        result: &result,
        highlights: highlight(&request.text, &result.keywords),
        trend,
    };
    Ok(Json(serde_json::to_value(&response)?))
}

pub async fn trend_handler(State(state): State<HttpState>) -> impl IntoResponse {
    let snapshot = state.trend.lock().await.snapshot();
    Json(json!({ "trend": snapshot }))
}

pub async fn report_handler(
    State(state): State<HttpState>,
    Json(request): Json<ReportRequest>,
) -> Result<impl IntoResponse> {
    let bytes = state.renderer.render(&request.text, &request.result)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        bytes,
    ))
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route("/analyze", post(analyze_handler))
        .route("/trend", get(trend_handler))
        .route("/report", post(report_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Start the HTTP server backed by the configured Gemini model
pub async fn start_http_server(config: Config) -> Result<()> {
    let config = Arc::new(config);
    if config.runtime.api_key.is_none() {
        tracing::warn!("No GEMINI_API_KEY set; every analysis will fail until one is configured");
    }
    let oracle = GeminiClient::from_config(&config)?;
    tracing::info!(model = oracle.model(), "oracle client ready");

    let state = HttpState::new(config.clone(), Arc::new(oracle));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.runtime.http_bind)
        .await
        .map_err(|e| StressLensError::Io {
            message: format!("Failed to bind HTTP listener: {}", e),
        })?;

    tracing::info!("Starting HTTP server on {}", config.runtime.http_bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
