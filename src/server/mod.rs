// Server module - Pingora HTTP server setup and configuration

use pingora::server::configuration::Opt as ServerOpt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::metrics::Metrics;
use crate::origin::{HttpOriginFetcher, OriginError};
use crate::policy::ConfigError;
use crate::proxy::{ResizeHandler, ResizeProxy};

/// Listener settings resolved from the application config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Address to bind to (e.g., "127.0.0.1:48879")
    pub address: String,
    /// Number of worker threads
    pub threads: usize,
}

impl ListenerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            address: config.server.listen_addr(),
            threads: config.server.effective_threads(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create origin client: {0}")]
    Origin(#[from] OriginError),
}

/// Shukusho HTTP server wrapper around Pingora
pub struct ShukushoServer {
    listener: ListenerConfig,
    server_opt: ServerOpt,
}

impl ShukushoServer {
    pub fn new(listener: ListenerConfig) -> Self {
        let mut server_opt = ServerOpt::default();
        server_opt.upgrade = false;
        server_opt.daemon = false;
        server_opt.nocapture = false;
        server_opt.test = false;
        server_opt.conf = None;

        Self {
            listener,
            server_opt,
        }
    }

    pub fn into_parts(self) -> (ListenerConfig, ServerOpt) {
        (self.listener, self.server_opt)
    }
}

/// Build the proxy with its policy, origin client and metrics
///
/// Fails on any configuration error, before a listener is bound.
pub fn build_proxy(config: &Config) -> Result<ResizeProxy, StartupError> {
    config.validate()?;
    let policy = config.to_policy()?;
    let fetcher = HttpOriginFetcher::new(config.to_fetcher_config())?;

    let handler = ResizeHandler::new(
        Arc::new(policy),
        Arc::new(fetcher),
        Arc::new(Metrics::new()),
    );
    Ok(ResizeProxy::new(handler))
}
