//! Origin fetcher.
//!
//! Fetches the source image named by a request from its origin server over
//! plain HTTP. Each request makes exactly one attempt: no retries and no
//! caching. Connecting and the whole fetch are each bounded by a timeout, so
//! an origin that accepts a connection and then stays silent cannot hold a
//! request open.
//!
//! # Failure classification
//!
//! - DNS or connection failure, including a connect timeout →
//!   [`OriginError::Unavailable`] (served as 404)
//! - Anything else → a generic fetch failure (served as 500)

pub mod error;

pub use error::OriginError;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_ORIGIN_BODY_SIZE, DEFAULT_ORIGIN_CONNECT_TIMEOUT_SECS,
    DEFAULT_ORIGIN_REQUEST_TIMEOUT_SECS,
};

/// Body and headers of a successful origin response
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub bytes: Bytes,
    /// Header names are case-insensitive
    pub headers: HeaderMap,
}

impl OriginResponse {
    pub fn new(bytes: impl Into<Bytes>, headers: HeaderMap) -> Self {
        Self {
            bytes: bytes.into(),
            headers,
        }
    }
}

/// Source of origin images
///
/// The production implementation is [`HttpOriginFetcher`]; the trait exists
/// so the request handler can be driven without a network.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<OriginResponse, OriginError>;
}

/// Configuration for the HTTP origin fetcher.
#[derive(Debug, Clone)]
pub struct OriginFetcherConfig {
    /// Largest origin body accepted, in bytes
    pub max_body_size: usize,
    /// Time allowed to resolve and connect
    pub connect_timeout: Duration,
    /// Time allowed for the whole fetch, body included
    pub timeout: Duration,
}

impl Default for OriginFetcherConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_ORIGIN_BODY_SIZE,
            connect_timeout: Duration::from_secs(DEFAULT_ORIGIN_CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(DEFAULT_ORIGIN_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Fetches origin images with a shared `reqwest` client
#[derive(Clone)]
pub struct HttpOriginFetcher {
    http_client: reqwest::Client,
    max_body_size: usize,
}

impl HttpOriginFetcher {
    /// Create a new fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `OriginError::Transport` if the HTTP client cannot be created
    /// (e.g., TLS backend initialisation failure).
    pub fn new(config: OriginFetcherConfig) -> Result<Self, OriginError> {
        // Origins are always fetched directly, never through an environment proxy
        let http_client = reqwest::Client::builder()
            .no_proxy()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| OriginError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            max_body_size: config.max_body_size,
        })
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

#[async_trait]
impl OriginFetcher for HttpOriginFetcher {
    async fn fetch(&self, url: &str) -> Result<OriginResponse, OriginError> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(OriginError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OriginError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_body_size {
                return Err(OriginError::BodyTooLarge {
                    size: len as usize,
                    max_size: self.max_body_size,
                });
            }
        }

        let headers = convert_headers(response.headers());

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(OriginError::from_reqwest)? {
            if body.len() + chunk.len() > self.max_body_size {
                return Err(OriginError::BodyTooLarge {
                    size: body.len() + chunk.len(),
                    max_size: self.max_body_size,
                });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "Fetched origin image"
        );

        Ok(OriginResponse::new(body.freeze(), headers))
    }
}

/// Copy reqwest's headers into an `http` 1.x header map
///
/// Entries that fail to convert are dropped.
fn convert_headers(source: &reqwest::header::HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }
    headers
}
