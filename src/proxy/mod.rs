// Proxy module - Pingora ProxyHttp implementation
// Every request is answered from request_filter; no upstream peer is ever selected

pub mod handler;
pub mod response;
pub mod special_endpoints;

use async_trait::async_trait;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_http::ResponseHeader;
use pingora_proxy::{ProxyHttp, Session};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Metrics;
use crate::pipeline::RequestContext;

pub use handler::ResizeHandler;
pub use response::ResizeResponse;

/// ResizeProxy implements the Pingora ProxyHttp trait
/// Serves resized origin images plus the /health and /metrics endpoints
pub struct ResizeProxy {
    handler: ResizeHandler,
    /// Proxy start time (for uptime calculation in /health endpoint)
    start_time: Instant,
}

impl ResizeProxy {
    pub fn new(handler: ResizeHandler) -> Self {
        Self {
            handler,
            start_time: Instant::now(),
        }
    }

    /// Get metrics instance (for testing and the /metrics endpoint)
    pub fn metrics(&self) -> Arc<Metrics> {
        self.handler.metrics()
    }

    /// Produce the response for a request without touching a session
    pub async fn respond(&self, ctx: &mut RequestContext) -> ResizeResponse {
        let metrics = self.handler.metrics();
        match special_endpoints::handle_special(ctx.path(), self.start_time, &metrics) {
            Some(endpoint) => endpoint.into(),
            None => self.handler.handle(ctx).await,
        }
    }
}

/// Write a complete response (header and body) to the session
async fn write_response(session: &mut Session, response: ResizeResponse) -> Result<()> {
    let mut header = ResponseHeader::build(response.status, Some(response.headers.len()))?;
    header.set_reason_phrase(Some(response.reason))?;
    for (name, value) in response.headers {
        header.insert_header(name, value)?;
    }

    session
        .write_response_header(Box::new(header), false)
        .await?;
    session
        .write_response_body(Some(response.body), true)
        .await?;
    Ok(())
}

#[async_trait]
impl ProxyHttp for ResizeProxy {
    type CTX = RequestContext;

    /// Placeholder until request_filter sees the request header
    fn new_ctx(&self) -> Self::CTX {
        RequestContext::pending()
    }

    /// Never reached: request_filter always short-circuits
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        Err(pingora_core::Error::explain(
            pingora_core::ErrorType::InternalError,
            "resize proxy does not forward requests upstream",
        ))
    }

    /// Run the resize pipeline and write its response
    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        let req = session.req_header();
        let method = req.method.as_str().to_string();
        let path = req.uri.path().to_string();
        let query = req.uri.query().map(str::to_string);
        *ctx = RequestContext::new(method, path, query.as_deref());

        let response = self.respond(ctx).await;
        write_response(session, response).await?;

        Ok(true) // Short-circuit (response already sent)
    }

    async fn logging(
        &self,
        session: &mut Session,
        e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status_code = session
            .response_written()
            .map(|resp| resp.status.as_u16())
            .unwrap_or(500);

        if let Some(err) = e {
            tracing::error!(
                request_id = %ctx.request_id(),
                path = %ctx.path(),
                status = status_code,
                error = %err,
                "Failed to send response"
            );
        } else {
            tracing::debug!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                status = status_code,
                stage = ctx.stage().as_str(),
                duration_ms = ctx.elapsed().as_millis() as u64,
                "Request completed"
            );
        }
    }
}
