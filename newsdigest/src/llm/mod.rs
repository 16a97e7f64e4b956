use thiserror::Error;

/// Core trait for text completion backends
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate completion text for a given prompt
    async fn generate(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Request structure for a single completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_output_tokens: Option<u32>,
}

/// Failure of one completion call, classified so a `RetryPolicy` can decide on another attempt.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The endpoint answered with a non-success status.
    #[error(
        "completion API error {code} ({}): {message}",
        .status.as_deref().unwrap_or("no status")
    )]
    Api {
        code: u16,
        /// Vendor status string, e.g. `RESOURCE_EXHAUSTED`
        status: Option<String>,
        message: String,
    },

    /// The request never produced a response (connect error, timeout).
    #[error("completion request failed: {0}")]
    Transport(String),

    /// A response arrived but could not be understood.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

pub mod gemini;
pub mod retry;
pub mod summarizer;
