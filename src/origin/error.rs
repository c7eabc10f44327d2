//! Origin fetch error types.

use thiserror::Error;

/// Errors that can occur while fetching a source image from its origin
#[derive(Debug, Clone, Error)]
pub enum OriginError {
    /// Name resolution or TCP connection failed. Reported to clients as
    /// "not found" so that network details never leak.
    #[error("Origin unavailable: {0}")]
    Unavailable(String),

    /// Origin answered with a non-success status
    #[error("Origin returned status {0}")]
    Status(u16),

    /// Origin body exceeded the configured limit
    #[error("Origin body of {size} bytes exceeds maximum {max_size} bytes")]
    BodyTooLarge { size: usize, max_size: usize },

    /// Origin URL could not be turned into a request
    #[error("Invalid origin URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Any other transport failure (timeouts, protocol errors, body reads)
    #[error("Origin fetch failed: {0}")]
    Transport(String),
}

impl OriginError {
    /// Classify a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            OriginError::Unavailable(err.to_string())
        } else if err.is_builder() {
            OriginError::InvalidUrl {
                url: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                message: err.to_string(),
            }
        } else {
            OriginError::Transport(err.to_string())
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, OriginError::Unavailable(_))
    }
}
