use anyhow::Context;
use clap::Parser;
use pingora_core::server::Server;
use shukusho::config::{Config, ConfigOverrides};
use shukusho::server::{build_proxy, ListenerConfig, ShukushoServer};
use std::path::PathBuf;

/// Shukusho - resizing image proxy built with Cloudflare's Pingora
#[derive(Parser, Debug)]
#[command(name = "shukusho")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    address: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging, single worker thread
    #[arg(long)]
    debug: bool,

    /// Number of worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Regexp an origin must fully match (repeatable)
    #[arg(long = "origin-regexp", value_name = "REGEXP")]
    origin_regexps: Vec<String>,

    /// Allowed output size as "w,h" (repeatable)
    #[arg(long = "size", value_name = "W,H")]
    sizes: Vec<String>,

    /// Default resampling method: nearest, bilinear, bicubic or antialias
    #[arg(long)]
    resample: Option<String>,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            address: self.address.clone(),
            port: self.port,
            debug: self.debug,
            threads: self.threads,
            origin_regexps: self.origin_regexps.clone(),
            sizes: self.sizes.clone(),
            resample: self.resample.clone(),
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    Ok(config.apply_overrides(args.overrides()))
}

fn main() {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("{:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = shukusho::logging::init_subscriber(config.server.debug) {
        eprintln!("Failed to initialize logging subsystem: {}", e);
        std::process::exit(1);
    }

    let proxy = build_proxy(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        config_file = ?args.config,
        origin_regexps = config.policy.origin_regexps.len(),
        sizes = config.policy.sizes.len(),
        resample = %config.policy.resample,
        debug = config.server.debug,
        "Configuration loaded successfully"
    );

    if args.test {
        tracing::info!("Configuration test passed");
        return;
    }

    let (listener, server_opt) =
        ShukushoServer::new(ListenerConfig::from_config(&config)).into_parts();

    let mut server = Server::new(Some(server_opt)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to create Pingora server");
        std::process::exit(1);
    });
    server.bootstrap();

    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, proxy);

    proxy_service.add_tcp(&listener.address);
    proxy_service.threads = Some(listener.threads);

    tracing::info!(
        address = %listener.address,
        threads = listener.threads,
        "Starting Shukusho image proxy"
    );

    server.add_service(proxy_service);

    // Run server forever (blocks until shutdown)
    server.run_forever();
}
