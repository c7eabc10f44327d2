//! Request orchestration for the resize proxy.
//!
//! One request runs: method check, route match, plan validation, origin
//! fetch, transform, response. Policy violations never reach the origin.
//! Decoding and resizing run on the blocking pool so the event loop stays
//! free while large images are processed.

use http::HeaderMap;
use std::sync::Arc;

use crate::error::ProxyError;
use crate::metrics::Metrics;
use crate::origin::OriginFetcher;
use crate::pipeline::{RequestContext, RequestPlan, Stage};
use crate::policy::PolicyConfig;
use crate::proxy::response::ResizeResponse;
use crate::resize::{self, TransformedImage};
use crate::router::match_route;

/// Drives a single request through the pipeline
#[derive(Clone)]
pub struct ResizeHandler {
    policy: Arc<PolicyConfig>,
    fetcher: Arc<dyn OriginFetcher>,
    metrics: Arc<Metrics>,
}

impl ResizeHandler {
    pub fn new(
        policy: Arc<PolicyConfig>,
        fetcher: Arc<dyn OriginFetcher>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            policy,
            fetcher,
            metrics,
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the pipeline and turn its outcome into a response
    ///
    /// Never fails: every error maps to a status and reason phrase.
    pub async fn handle(&self, ctx: &mut RequestContext) -> ResizeResponse {
        self.metrics.increment_request_count();
        self.metrics.increment_active_requests();

        let outcome = self.process(ctx).await;

        self.metrics.decrement_active_requests();

        let response = match outcome {
            Ok((image, origin_headers)) => {
                ctx.advance(Stage::Writing);
                tracing::info!(
                    request_id = %ctx.request_id(),
                    path = %ctx.path(),
                    format = %image.format,
                    source_size = %image.source_size,
                    output_size = %image.output_size,
                    bytes = image.data.len(),
                    duration_ms = ctx.elapsed().as_millis() as u64,
                    "Image resized"
                );
                self.metrics.add_bytes_sent(image.data.len() as u64);
                ResizeResponse::image(image, &origin_headers, ctx.request_id())
            }
            Err(err) => {
                self.log_failure(ctx, &err);
                ctx.advance(Stage::Error);
                self.metrics.increment_error(err.kind());
                ResizeResponse::error(&err, ctx.request_id())
            }
        };

        ctx.advance(Stage::Done);
        self.metrics.increment_status_count(response.status);
        self.metrics.record_duration(ctx.elapsed());
        response
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<(TransformedImage, HeaderMap), ProxyError> {
        if ctx.method() != "GET" {
            return Err(ProxyError::MethodNotAllowed(ctx.method().to_string()));
        }

        let route = match_route(ctx.path()).ok_or(ProxyError::NotFound)?;
        let plan = RequestPlan::parse(&route, ctx.query_param("resample"), &self.policy)?;
        self.metrics.increment_operation(plan.op);

        tracing::debug!(
            request_id = %ctx.request_id(),
            op = %plan.op,
            size = %plan.size,
            origin = %plan.origin_url,
            resample = %plan.resample,
            "Request validated"
        );

        ctx.advance(Stage::Fetching);
        let origin = self.fetcher.fetch(&plan.origin_url).await?;
        self.metrics.add_bytes_fetched(origin.bytes.len() as u64);

        ctx.advance(Stage::Transforming);
        let bytes = origin.bytes;
        let RequestPlan {
            op, size, resample, ..
        } = plan;
        let image = tokio::task::spawn_blocking(move || resize::transform(&bytes, op, size, resample))
            .await
            .map_err(|e| ProxyError::Internal(format!("Transform task failed: {}", e)))??;

        Ok((image, origin.headers))
    }

    fn log_failure(&self, ctx: &RequestContext, err: &ProxyError) {
        let status = err.to_http_status();
        if err.is_client_error() {
            tracing::warn!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                stage = ctx.stage().as_str(),
                status = status,
                error = %err,
                "Request rejected"
            );
        } else {
            tracing::error!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                stage = ctx.stage().as_str(),
                status = status,
                error = %err,
                "Request failed"
            );
        }
    }
}
