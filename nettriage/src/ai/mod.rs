pub mod openai;
pub mod prompts;
pub mod provider;
pub mod proxy;
pub mod response;

use thiserror::Error;

// Re-export for convenience
pub use openai::OpenAiClient;
pub use provider::{build_provider, CompletionProvider, ModelInfo};
pub use proxy::ProxyClient;
pub use response::coerce_diagnosis;

/// Failures talking to a completion service. Rule-based diagnosis never
/// produces these.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("completion request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("completion service returned {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("unreadable completion reply: {0}")]
    ParseError(String),
    #[error("rate limited by the completion service (retry after {retry_after}s)")]
    RateLimited { retry_after: u64 },
    #[error("missing API key: set OPENAI_API_KEY or use the proxy provider")]
    MissingApiKey,
    #[error("completion reply has no usable content: {0}")]
    InvalidResponse(String),
}
