use postcraft_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API key is not configured (set POSTCRAFT_COMPLETION_API_KEY or GROQ_API_KEY)")]
    MissingApiKey,

    #[error("invalid completion base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("completion service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response had no message content")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("requested {requested} candidate posts but only {usable} were usable")]
    Generation { requested: usize, usable: usize },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to serialize trend snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("generated post not found: {0}")]
    NotFound(String),

    #[error("feedback comment is empty")]
    EmptyComment,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
