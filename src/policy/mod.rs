//! Request policy - which origins, sizes and resample methods are allowed.
//!
//! A [`PolicyConfig`] is built once from raw configuration values at startup
//! and shared read-only (behind an `Arc`) by every request. Any invalid value
//! fails construction with a [`ConfigError`]; there is no runtime recovery
//! path for bad configuration.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::DEFAULT_RESAMPLE;
use crate::resize::{ResampleMethod, Size};

/// Fatal startup configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid origin regexp: {pattern}: {message}")]
    InvalidOriginRegexp { pattern: String, message: String },

    #[error("Invalid 'w,h' pair: {0}")]
    InvalidSize(String),

    #[error("Invalid resampling method: {0}")]
    InvalidResample(String),

    #[error("{0}")]
    Invalid(String),
}

/// Immutable, validated request policy
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    origin_patterns: Vec<Regex>,
    allowed_sizes: HashSet<Size>,
    default_resample: ResampleMethod,
}

impl Default for PolicyConfig {
    /// No origin or size restrictions, antialias resampling
    fn default() -> Self {
        Self {
            origin_patterns: Vec::new(),
            allowed_sizes: HashSet::new(),
            default_resample: ResampleMethod::default(),
        }
    }
}

impl PolicyConfig {
    /// Build a policy from raw configuration strings
    ///
    /// # Arguments
    /// * `origin_regexps` - Patterns an origin must fully match (case-insensitive)
    /// * `sizes` - `"w,h"` strings; empty means any size is allowed
    /// * `resample` - Default resample method name; empty means `antialias`
    pub fn new<S: AsRef<str>>(
        origin_regexps: &[S],
        sizes: &[S],
        resample: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            origin_patterns: compile_origin_patterns(origin_regexps)?,
            allowed_sizes: parse_sizes(sizes)?,
            default_resample: validate_resample(resample)?,
        })
    }

    pub fn origin_patterns(&self) -> &[Regex] {
        &self.origin_patterns
    }

    pub fn allowed_sizes(&self) -> &HashSet<Size> {
        &self.allowed_sizes
    }

    pub fn default_resample(&self) -> ResampleMethod {
        self.default_resample
    }

    /// An origin is allowed when no patterns are configured, or when at
    /// least one pattern matches the whole origin string
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.origin_patterns.is_empty() || self.origin_patterns.iter().any(|p| p.is_match(origin))
    }

    /// A size is allowed when no sizes are configured, or when it is one of them
    pub fn size_allowed(&self, size: Size) -> bool {
        self.allowed_sizes.is_empty() || self.allowed_sizes.contains(&size)
    }
}

/// Compile origin patterns, anchored at both ends and case-insensitive
pub fn compile_origin_patterns<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Regex>, ConfigError> {
    raw.iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            let invalid = |e: regex::Error| ConfigError::InvalidOriginRegexp {
                pattern: pattern.to_string(),
                message: e.to_string(),
            };

            // The bare pattern must compile on its own; wrapping it in a group
            // could otherwise turn an unbalanced pattern into a valid one
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(invalid)?;

            RegexBuilder::new(&format!("^(?:{})$", pattern))
                .case_insensitive(true)
                .build()
                .map_err(invalid)
        })
        .collect()
}

/// Parse `"w,h"` strings into a set of sizes
pub fn parse_sizes<S: AsRef<str>>(raw: &[S]) -> Result<HashSet<Size>, ConfigError> {
    raw.iter()
        .map(|wh| {
            let wh = wh.as_ref();
            let invalid = || ConfigError::InvalidSize(wh.to_string());

            let mut parts = wh.split(',');
            let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(invalid());
            };
            let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
            let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
            Ok(Size::new(width, height))
        })
        .collect()
}

/// Validate the default resample method name
pub fn validate_resample(name: &str) -> Result<ResampleMethod, ConfigError> {
    let name = if name.is_empty() { DEFAULT_RESAMPLE } else { name };
    name.parse::<ResampleMethod>()
        .map_err(|_| ConfigError::InvalidResample(name.to_string()))
}
