//! Referer-resolving reverse proxy.
//!
//! ```text
//!     Client ──▶ listener ──▶ router ──┬──▶ /newf* : static welcome
//!                                      │
//!                                      └──▶ forwarder ──▶ upstream
//!                                             │
//!     Client ◀── filtered headers + streamed body ◀┘
//! ```
//!
//! The forwarder rebuilds the upstream path from the Referer's path and the
//! request path, strips `Connection` and `Accept-Encoding` in both
//! directions and relays status, headers and body.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;

use referer_proxy::cli::Cli;
use referer_proxy::config::ProxyConfig;
use referer_proxy::lifecycle::{spawn_signal_handler, Shutdown};
use referer_proxy::net::Listener;
use referer_proxy::observability::{logging, metrics};
use referer_proxy::HttpServer;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("referer-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = Listener::bind(&config.listener).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    server.run(listener, signal).await?;
    Ok(())
}
