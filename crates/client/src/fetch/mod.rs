//! HTTP page source for the feed loader.
//!
//! ### Request
//! - `GET` the continuation URL exactly as the server reported it
//! - Anti-forgery token travels in the `X-Feed-Nonce` header, so cached
//!   URLs stay token-free
//!
//! ### Failure classes
//! - Network error, timeout, non-2xx status
//! - Body over `max_bytes`, body that is not a feed envelope
//! - Envelope with its `error` flag set (the server answers those with 200)

pub mod error;
pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url, header};
use std::time::{Duration, Instant};

pub use self::error::FetchError;
pub use self::url::{UrlError, canonicalize, resolve};

use feedline_core::{AppConfig, FeedEnvelope};

/// Header carrying the anti-forgery token.
pub const NONCE_HEADER: &str = "X-Feed-Nonce";

/// Source of feed pages.
///
/// Implemented over HTTP by [`FetchClient`]; the loader only depends on
/// this trait.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &Url, nonce: Option<&str>) -> Result<FeedEnvelope, FetchError>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "feedline/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 2MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "feedline/0.1".to_string(), max_bytes: 2 * 1024 * 1024, timeout: Duration::from_millis(20000) }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), max_bytes: config.max_bytes, timeout: config.timeout() }
    }
}

/// HTTP client fetching feed envelopes.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch an arbitrary HTML document, such as the archive host page.
    pub async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let bytes = self.read_body(response).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Bytes, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpError { status: status.as_u16() });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(FetchError::TooLarge { size: len as usize, limit: self.config.max_bytes });
        }

        let bytes = response.bytes().await?;

        if bytes.len() > self.config.max_bytes {
            return Err(FetchError::TooLarge { size: bytes.len(), limit: self.config.max_bytes });
        }

        Ok(bytes)
    }
}

/// Decode a feed endpoint body, treating a set `error` flag as failure.
pub fn decode_envelope(bytes: &Bytes) -> Result<FeedEnvelope, FetchError> {
    let envelope: FeedEnvelope = serde_json::from_slice(bytes).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if let Some(error) = envelope.error.as_deref() {
        return Err(FetchError::Rejected(error.to_string()));
    }

    Ok(envelope)
}

#[async_trait]
impl PageSource for FetchClient {
    async fn fetch_page(&self, url: &Url, nonce: Option<&str>) -> Result<FeedEnvelope, FetchError> {
        let start = Instant::now();

        let mut request = self.http.get(url.as_str()).header(header::ACCEPT, "application/json");
        if let Some(nonce) = nonce {
            request = request.header(NONCE_HEADER, nonce);
        }

        let response = request.send().await?;
        let bytes = self.read_body(response).await?;
        let envelope = decode_envelope(&bytes)?;

        tracing::debug!(
            url = %url,
            paged = envelope.paged,
            page_max = envelope.page_max,
            cards = envelope.cards.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched feed page"
        );

        Ok(envelope)
    }
}
