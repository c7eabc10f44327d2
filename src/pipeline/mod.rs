// Request pipeline module - per-request context and the validated plan

pub mod plan;

pub use plan::RequestPlan;

use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::router::parse_query;

/// Stage a request has reached; `Error` absorbs from any stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    Fetching,
    Transforming,
    Writing,
    Done,
    Error,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Parsing => "parsing",
            Stage::Fetching => "fetching",
            Stage::Transforming => "transforming",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Error => "error",
        }
    }
}

/// Request context that holds all information about an HTTP request
/// as it flows through the pipeline
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    query_params: HashMap<String, String>,
    started: Instant,
    stage: Stage,
}

impl RequestContext {
    /// Create a new RequestContext from HTTP request information
    /// Automatically generates a unique request ID (UUID v4)
    pub fn new(method: impl Into<String>, path: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: method.into(),
            path: path.into(),
            query_params: parse_query(query),
            started: Instant::now(),
            stage: Stage::Parsing,
        }
    }

    /// Context for a connection whose request header has not been read yet
    ///
    /// Carries no request id; it is replaced once the header is available.
    pub fn pending() -> Self {
        Self {
            request_id: String::new(),
            method: String::new(),
            path: String::new(),
            query_params: HashMap::new(),
            started: Instant::now(),
            stage: Stage::Parsing,
        }
    }

    /// Get the unique request ID
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Get the HTTP method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a single query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Time since the context was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to the next stage; once in `Error` the context stays there
    pub fn advance(&mut self, stage: Stage) {
        if self.stage != Stage::Error {
            self.stage = stage;
        }
    }
}
