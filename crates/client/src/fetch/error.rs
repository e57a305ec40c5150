//! Feed page fetch errors.

use std::sync::Arc;

/// Errors from fetching a feed page.
///
/// Cloneable so one failed request can be reported to every caller that
/// was coalesced onto it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// HTTP client could not be constructed.
    #[error("client setup failed: {0}")]
    Setup(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Non-2xx response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Response body exceeded the configured limit.
    #[error("response too large: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },

    /// Response body is not a feed envelope.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The server answered with an envelope carrying an `error` flag.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Network(Arc::new(err)) }
    }
}
