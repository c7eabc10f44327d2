// Request plan - validates a matched route against policy.
//
// Checks run in a fixed order (operation, origin, size, resample) and the
// first failure wins. Nothing here touches the network.

use crate::constants::{MAX_OUTPUT_PIXELS, ORIGIN_SCHEME};
use crate::error::ProxyError;
use crate::policy::PolicyConfig;
use crate::resize::{Operation, ResampleMethod, Size};
use crate::router::RouteMatch;

/// Fully validated description of one resize request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    pub op: Operation,
    pub size: Size,
    /// `http://` + the raw origin segment
    pub origin_url: String,
    pub resample: ResampleMethod,
}

impl RequestPlan {
    /// Validate raw route components and an optional `resample` override
    pub fn parse(
        route: &RouteMatch,
        resample: Option<&str>,
        policy: &PolicyConfig,
    ) -> Result<Self, ProxyError> {
        let op = parse_operation(&route.op)?;
        let origin_url = resolve_origin(&route.origin, policy)?;
        let size = parse_size(&route.width, &route.height, policy)?;
        let resample = resolve_resample(resample, policy)?;

        Ok(Self {
            op,
            size,
            origin_url,
            resample,
        })
    }
}

fn parse_operation(op: &str) -> Result<Operation, ProxyError> {
    op.parse::<Operation>().map_err(ProxyError::from)
}

fn resolve_origin(origin: &str, policy: &PolicyConfig) -> Result<String, ProxyError> {
    if !policy.origin_allowed(origin) {
        return Err(ProxyError::OriginNotAllowed(origin.to_string()));
    }
    Ok(format!("{}{}", ORIGIN_SCHEME, origin))
}

fn parse_size(width: &str, height: &str, policy: &PolicyConfig) -> Result<Size, ProxyError> {
    let invalid = || ProxyError::InvalidSize {
        width: width.to_string(),
        height: height.to_string(),
    };

    let size = Size::new(
        width.parse::<u32>().map_err(|_| invalid())?,
        height.parse::<u32>().map_err(|_| invalid())?,
    );
    if !size.is_positive() || size.pixel_count() > MAX_OUTPUT_PIXELS {
        return Err(invalid());
    }

    if !policy.size_allowed(size) {
        return Err(ProxyError::SizeNotAllowed(size));
    }
    Ok(size)
}

fn resolve_resample(
    requested: Option<&str>,
    policy: &PolicyConfig,
) -> Result<ResampleMethod, ProxyError> {
    // Query values are whitespace-trimmed before lookup
    match requested.map(str::trim) {
        Some(name) => name
            .parse::<ResampleMethod>()
            .map_err(|_| ProxyError::ResampleNotAllowed(name.to_string())),
        None => Ok(policy.default_resample()),
    }
}
