// Configuration module

pub mod server;

pub use server::ServerConfig;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{DEFAULT_MAX_ORIGIN_BODY_SIZE, DEFAULT_RESAMPLE};
use crate::origin::OriginFetcherConfig;
use crate::policy::{ConfigError, PolicyConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub origin: OriginSettings,
}

fn default_resample() -> String {
    DEFAULT_RESAMPLE.to_string()
}

/// Raw policy values; validated by [`Config::to_policy`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicySettings {
    /// Regexes the whole origin (host + path) must match; empty allows all
    #[serde(default)]
    pub origin_regexps: Vec<String>,
    /// `"w,h"` pairs; empty allows any size
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default = "default_resample")]
    pub resample: String,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            origin_regexps: Vec::new(),
            sizes: Vec::new(),
            resample: default_resample(),
        }
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_ORIGIN_BODY_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OriginSettings {
    /// Largest origin body accepted, in bytes (default: 32 MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Whole-request timeout for origin fetches (default: 20 seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for OriginSettings {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            timeout_secs: None,
        }
    }
}

/// Values given on the command line; `Some`/non-empty entries win over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub threads: Option<usize>,
    pub origin_regexps: Vec<String>,
    pub sizes: Vec<String>,
    pub resample: Option<String>,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Layer command-line values over this configuration
    ///
    /// Repeatable lists replace the file's list when given at all.
    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(address) = overrides.address {
            self.server.address = address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if overrides.debug {
            self.server.debug = true;
        }
        if let Some(threads) = overrides.threads {
            self.server.threads = threads;
        }
        if !overrides.origin_regexps.is_empty() {
            self.policy.origin_regexps = overrides.origin_regexps;
        }
        if !overrides.sizes.is_empty() {
            self.policy.sizes = overrides.sizes;
        }
        if let Some(resample) = overrides.resample {
            self.policy.resample = resample;
        }
        self
    }

    /// Compile and validate the policy section
    pub fn to_policy(&self) -> Result<PolicyConfig, ConfigError> {
        PolicyConfig::new(
            &self.policy.origin_regexps,
            &self.policy.sizes,
            &self.policy.resample,
        )
    }

    pub fn to_fetcher_config(&self) -> OriginFetcherConfig {
        let defaults = OriginFetcherConfig::default();
        OriginFetcherConfig {
            max_body_size: self.origin.max_body_size,
            timeout: self
                .origin
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            ..defaults
        }
    }

    /// Check everything that would otherwise fail at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.origin.max_body_size == 0 {
            return Err(ConfigError::Invalid(
                "origin.max_body_size must be greater than 0".to_string(),
            ));
        }
        if self.origin.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "origin.timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.to_policy().map(|_| ())
    }
}
