use postcraft_store::StoreError;
use thiserror::Error;

/// Failure of a single feed page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authentication rejected for {profile_id}: {reason}")]
    Auth { profile_id: String, reason: String },

    #[error("profile not found: {profile_id}")]
    NotFound { profile_id: String },

    #[error("transient fetch failure: {reason}")]
    Transient {
        reason: String,
        /// Raw response body, when one was received.
        body: Option<String>,
    },

    #[error("unexpected HTTP status {status} for {profile_id}")]
    UnexpectedStatus {
        status: u16,
        profile_id: String,
        body: Option<String>,
    },
}

impl FetchError {
    /// Returns `true` for failures that may clear up on a later attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }

    /// Raw response body carried by the error, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchError::Transient { body, .. } | FetchError::UnexpectedStatus { body, .. } => {
                body.as_deref()
            }
            FetchError::Auth { .. } | FetchError::NotFound { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid feed base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("no session cookie configured (set POSTCRAFT_SESSION_COOKIE)")]
    MissingSessionCookie,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

/// Reason a feed fragment could not be turned into a post record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedFragment {
    #[error("fragment has no post text")]
    EmptyText,

    #[error("fragment has no timestamp")]
    MissingTimestamp,

    #[error("unrecognized timestamp \"{0}\"")]
    BadTimestamp(String),
}
