//! bang-suggest server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ axum ──▶ routing ──┬──▶ suggest::forward ──▶ upstream API
//!                                   │        │
//!                                   │        ▼
//!     Client ◀── rewritten chunks ◀─┼── stream + rewrite
//!                                   │
//!                                   └──▶ ServeDir (public/)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use bang_suggest::config::{load_config, validate_config, ConfigError, ProxyConfig};
use bang_suggest::observability::{logging, metrics};
use bang_suggest::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "bang-suggest")]
#[command(about = "Autocomplete proxy that keeps the leading ! on every suggestion", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override static_files.root.
    #[arg(long)]
    static_root: Option<String>,

    /// Override upstream.base_url.
    #[arg(long)]
    upstream: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(root) = self.static_root {
            config.static_files.root = root;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.base_url = upstream;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability)?;

    tracing::info!("bang-suggest v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        max_upstream_connections = config.upstream.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
