//! Response construction for the resize pipeline.
//!
//! Handlers produce a [`ResizeResponse`] instead of writing to the Pingora
//! session directly; the proxy writes it out. Only the allowlisted origin
//! headers are copied onto a successful response.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue};

use crate::constants::PRESERVED_ORIGIN_HEADERS;
use crate::error::ProxyError;
use crate::resize::TransformedImage;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Fully-formed HTTP response produced by the handler
#[derive(Debug, Clone)]
pub struct ResizeResponse {
    pub status: u16,
    /// Reason phrase for the status line
    pub reason: &'static str,
    /// Headers in the order they are written
    pub headers: Vec<(&'static str, HeaderValue)>,
    pub body: Bytes,
}

impl ResizeResponse {
    /// 200 response carrying the transformed image
    pub fn image(image: TransformedImage, origin_headers: &HeaderMap, request_id: &str) -> Self {
        let mut headers = vec![
            ("Content-Type", HeaderValue::from_static(image.content_type())),
            ("Content-Length", HeaderValue::from(image.data.len())),
        ];
        headers.extend(request_id_header(request_id));
        headers.extend(preserved_headers(origin_headers));

        Self {
            status: 200,
            reason: "OK",
            headers,
            body: Bytes::from(image.data),
        }
    }

    /// Error response: the reason phrase doubles as a plain-text body
    pub fn error(err: &ProxyError, request_id: &str) -> Self {
        let reason = err.reason();
        let body = Bytes::from_static(reason.as_bytes());

        Self {
            status: err.to_http_status(),
            reason,
            headers: [
                (
                    "Content-Type",
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                ("Content-Length", HeaderValue::from(body.len())),
            ]
            .into_iter()
            .chain(request_id_header(request_id))
            .collect(),
            body,
        }
    }

    /// Case-insensitive header lookup; values that are not visible ASCII read as `None`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.to_str().ok())
    }
}

/// Copy Cache-Control, Expires and Last-Modified from the origin response
///
/// Values are copied byte for byte, opaque (obs-text) bytes included.
pub fn preserved_headers(origin_headers: &HeaderMap) -> Vec<(&'static str, HeaderValue)> {
    PRESERVED_ORIGIN_HEADERS
        .iter()
        .filter_map(|name| {
            origin_headers
                .get(*name)
                .map(|value| (*name, value.clone()))
        })
        .collect()
}

/// Request ids are generated as UUIDs, so this only skips ids that could
/// not appear on the wire anyway
fn request_id_header(request_id: &str) -> Option<(&'static str, HeaderValue)> {
    HeaderValue::from_str(request_id)
        .ok()
        .map(|value| (REQUEST_ID_HEADER, value))
}
