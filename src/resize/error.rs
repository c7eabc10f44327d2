//! Resize error types
//!
//! Errors raised while parsing transform parameters or while decoding,
//! resizing and re-encoding a source image.

use thiserror::Error;

/// Errors that can occur during an image transform
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResizeError {
    // === Parameter Errors ===
    /// Operation name is not one of fit, scale or tn
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// Resample method name is not one of the four known kernels
    #[error("Unknown resample method: {0}")]
    UnknownResample(String),

    // === Decoding Errors ===
    /// Failed to decode image data
    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),
    /// Image decoded but its format cannot be re-encoded
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    // === Processing Errors ===
    /// Resize operation failed
    #[error("Resize failed: {0}")]
    ResizeFailed(String),
    /// Encoding back to the source format failed
    #[error("Failed to encode to {format}: {message}")]
    EncodeFailed { format: String, message: String },
}

impl ResizeError {
    pub fn decode_failed(message: impl Into<String>) -> Self {
        ResizeError::DecodeFailed(message.into())
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ResizeError::ResizeFailed(message.into())
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ResizeError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    /// True when the source bytes themselves are unusable, as opposed to a
    /// failure inside the resize or encode step
    pub fn is_invalid_source(&self) -> bool {
        matches!(
            self,
            ResizeError::DecodeFailed(_) | ResizeError::UnsupportedFormat(_)
        )
    }
}
