//! Server configuration types.
//!
//! Listener address and port, debug mode and worker thread count.
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ADDRESS, DEFAULT_PORT, DEFAULT_THREADS};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Default worker thread count
fn default_threads() -> usize {
    DEFAULT_THREADS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Verbose logging and a single worker thread
    #[serde(default)]
    pub debug: bool,
    /// Number of worker threads for the proxy service (default: 4)
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            debug: false,
            threads: default_threads(),
        }
    }
}

impl ServerConfig {
    /// `address:port` string for the TCP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Debug mode always runs a single worker
    pub fn effective_threads(&self) -> usize {
        if self.debug {
            1
        } else {
            self.threads.max(1)
        }
    }
}
