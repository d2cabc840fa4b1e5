//! Command-line interface.
//!
//! Flags override values from the optional config file, which override the
//! built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{finalize, load_config};
use crate::config::ProxyConfig;
use crate::error::ConfigError;

#[derive(Parser, Debug, Default)]
#[command(name = "referer-proxy", version)]
#[command(about = "Reverse proxy that resolves request paths against the Referer", long_about = None)]
pub struct Cli {
    /// HTTP upstream, e.g. 192.168.3.1:81 or just 192.168.3.1
    #[arg(long)]
    pub upstream: Option<String>,

    /// Bind addr, e.g. 0.0.0.0:8000
    #[arg(long)]
    pub bind: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stream request bodies to the upstream
    #[arg(long)]
    pub forward_body: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Load, override and validate the configuration.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply(&mut config);
        finalize(config)
    }

    /// Apply flag overrides on top of `config`.
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(upstream) = &self.upstream {
            config.upstream.address = upstream.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if self.forward_body {
            config.upstream.forward_body = true;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}
