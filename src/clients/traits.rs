use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One structured-generation request: instructions plus the shape the reply must take.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub prompt: String,
    pub response_schema: Value,
    pub mime_type: &'static str,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no API key configured")]
    MissingCredentials,
    #[error("oracle reply contained no text")]
    EmptyReply,
}

/// A remote text-understanding service that answers in a constrained shape.
///
/// Implementations return the raw reply text untouched; validation happens in
/// `analysis`.
#[async_trait]
pub trait StructuredOracle: Send + Sync {
    async fn generate(&self, request: &OracleRequest) -> Result<String, OracleError>;
}
