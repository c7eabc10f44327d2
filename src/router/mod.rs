// Router module
//
// Matches `/{op}/{width}x{height}/{origin...}` and splits it into its raw
// components. Validation against policy happens later, in the pipeline.

use std::collections::HashMap;

/// Operations the route accepts in its first segment
pub const ROUTE_OPERATIONS: [&str; 3] = ["fit", "scale", "tn"];

/// Raw components of a matched resize route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub op: String,
    pub width: String,
    pub height: String,
    /// Host and path of the source image, percent-decoded
    pub origin: String,
}

/// Match a request path against the resize route
///
/// Returns `None` for any path that is not
/// `/(fit|scale|tn)/(\d+)x(\d+)/(.*)`.
pub fn match_route(path: &str) -> Option<RouteMatch> {
    let rest = path.strip_prefix('/')?;
    let mut segments = rest.splitn(3, '/');

    let op = segments.next()?;
    let dimensions = segments.next()?;
    let origin = segments.next()?;

    if !ROUTE_OPERATIONS.contains(&op) {
        return None;
    }

    let (width, height) = dimensions.split_once('x')?;
    if !is_digits(width) || !is_digits(height) {
        return None;
    }

    Some(RouteMatch {
        op: op.to_string(),
        width: width.to_string(),
        height: height.to_string(),
        origin: decode_component(origin),
    })
}

/// Extract query parameters; when a key repeats, the last value wins
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_query_component(key), decode_query_component(value));
        }
    }
    params
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Percent-decode a path component, keeping the raw text if it is not UTF-8
fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Query components additionally treat `+` as a space
fn decode_query_component(raw: &str) -> String {
    decode_component(&raw.replace('+', " "))
}
