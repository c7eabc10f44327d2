// Error types module

use std::fmt;

use crate::constants::{
    REASON_ORIGIN_NOT_ALLOWED, REASON_RESAMPLE_NOT_ALLOWED, REASON_SIZE_NOT_ALLOWED,
};
use crate::origin::OriginError;
use crate::resize::{ResizeError, Size};

/// Centralized request error type for the proxy
///
/// Every failure in the request pipeline ends up as exactly one of these,
/// and every variant maps to exactly one HTTP status and reason phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// Path does not match any route
    NotFound,

    /// Method other than GET
    MethodNotAllowed(String),

    /// Operation outside fit/scale/tn reached the parser
    UnsupportedOperation(String),

    /// Origin matches none of the configured patterns
    OriginNotAllowed(String),

    /// Width or height is zero or does not fit in 32 bits
    InvalidSize { width: String, height: String },

    /// Size is not one of the configured sizes
    SizeNotAllowed(Size),

    /// Resample method is not one of the known kernels
    ResampleNotAllowed(String),

    /// Origin host could not be resolved or connected to
    OriginUnavailable(String),

    /// Any other origin failure (bad status, oversize body, transport error)
    OriginFetch(String),

    /// Source bytes could not be decoded as a supported image
    InvalidImage(String),

    /// Resize or encode failed after a successful decode
    Transform(String),

    /// Unexpected internal failure (worker task panicked, etc.)
    Internal(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::NotFound => write!(f, "No route matches the request path"),
            ProxyError::MethodNotAllowed(method) => write!(f, "Method {} not allowed", method),
            ProxyError::UnsupportedOperation(op) => write!(f, "Unsupported operation: {}", op),
            ProxyError::OriginNotAllowed(origin) => write!(f, "Origin not allowed: {}", origin),
            ProxyError::InvalidSize { width, height } => {
                write!(f, "Invalid size: {}x{}", width, height)
            }
            ProxyError::SizeNotAllowed(size) => write!(f, "Size not allowed: {}", size),
            ProxyError::ResampleNotAllowed(method) => {
                write!(f, "Resample method not allowed: {}", method)
            }
            ProxyError::OriginUnavailable(msg) => write!(f, "Origin unavailable: {}", msg),
            ProxyError::OriginFetch(msg) => write!(f, "Origin fetch failed: {}", msg),
            ProxyError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ProxyError::Transform(msg) => write!(f, "Transform failed: {}", msg),
            ProxyError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {}

impl ProxyError {
    /// Maps request errors to HTTP status codes
    ///
    /// Status mapping:
    /// - OriginNotAllowed, SizeNotAllowed, ResampleNotAllowed → 403
    /// - NotFound, OriginUnavailable → 404
    /// - InvalidSize → 400
    /// - MethodNotAllowed → 405
    /// - InvalidImage → 415
    /// - everything else → 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            ProxyError::OriginNotAllowed(_)
            | ProxyError::SizeNotAllowed(_)
            | ProxyError::ResampleNotAllowed(_) => 403,

            ProxyError::NotFound | ProxyError::OriginUnavailable(_) => 404,

            ProxyError::InvalidSize { .. } => 400,

            ProxyError::MethodNotAllowed(_) => 405,

            ProxyError::InvalidImage(_) => 415,

            ProxyError::UnsupportedOperation(_)
            | ProxyError::OriginFetch(_)
            | ProxyError::Transform(_)
            | ProxyError::Internal(_) => 500,
        }
    }

    /// Reason phrase sent in the status line and as the response body
    ///
    /// Server-side failures share a generic phrase so origin and transport
    /// details stay in the logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ProxyError::OriginNotAllowed(_) => REASON_ORIGIN_NOT_ALLOWED,
            ProxyError::SizeNotAllowed(_) => REASON_SIZE_NOT_ALLOWED,
            ProxyError::ResampleNotAllowed(_) => REASON_RESAMPLE_NOT_ALLOWED,
            ProxyError::InvalidSize { .. } => "Invalid Size",
            ProxyError::NotFound | ProxyError::OriginUnavailable(_) => "Not Found",
            ProxyError::MethodNotAllowed(_) => "Method Not Allowed",
            ProxyError::InvalidImage(_) => "Invalid Image",
            ProxyError::UnsupportedOperation(_)
            | ProxyError::OriginFetch(_)
            | ProxyError::Transform(_)
            | ProxyError::Internal(_) => "Internal Server Error",
        }
    }

    /// 4xx errors are the client's doing; 5xx are ours or the origin's
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.to_http_status())
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::NotFound => "not_found",
            ProxyError::MethodNotAllowed(_) => "method_not_allowed",
            ProxyError::UnsupportedOperation(_) => "unsupported_operation",
            ProxyError::OriginNotAllowed(_) => "origin_not_allowed",
            ProxyError::InvalidSize { .. } => "invalid_size",
            ProxyError::SizeNotAllowed(_) => "size_not_allowed",
            ProxyError::ResampleNotAllowed(_) => "resample_not_allowed",
            ProxyError::OriginUnavailable(_) => "origin_unavailable",
            ProxyError::OriginFetch(_) => "origin_fetch",
            ProxyError::InvalidImage(_) => "invalid_image",
            ProxyError::Transform(_) => "transform",
            ProxyError::Internal(_) => "internal",
        }
    }
}

impl From<OriginError> for ProxyError {
    fn from(err: OriginError) -> Self {
        if err.is_unavailable() {
            ProxyError::OriginUnavailable(err.to_string())
        } else {
            ProxyError::OriginFetch(err.to_string())
        }
    }
}

impl From<ResizeError> for ProxyError {
    fn from(err: ResizeError) -> Self {
        match err {
            ResizeError::UnsupportedOperation(op) => ProxyError::UnsupportedOperation(op),
            ResizeError::UnknownResample(name) => ProxyError::ResampleNotAllowed(name),
            other if other.is_invalid_source() => ProxyError::InvalidImage(other.to_string()),
            other => ProxyError::Transform(other.to_string()),
        }
    }
}
