//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// The single upstream every proxied request is sent to.
    pub upstream: UpstreamConfig,

    /// Server-side timeouts.
    pub timeouts: TimeoutConfig,

    /// Static greeting endpoint.
    pub welcome: WelcomeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_connections: 10_000,
        }
    }
}

/// What to do with a request that carries no Referer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingRefererPolicy {
    /// Answer 400 Bad Request.
    #[default]
    Reject,
    /// Forward the request path unchanged.
    UseRequestPath,
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream `host[:port]`; port 80 is assumed when absent.
    pub address: String,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,

    /// Stream the inbound request body to the upstream.
    pub forward_body: bool,

    pub missing_referer: MissingRefererPolicy,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            timeout_secs: 60 * 60,
            forward_body: false,
            missing_referer: MissingRefererPolicy::Reject,
        }
    }
}

/// Timeout configuration for the inbound side.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to read request headers, in seconds.
    pub read_secs: u64,

    /// Time allowed to produce a response, in seconds.
    pub write_secs: u64,

    /// How long shutdown waits for in-flight requests, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 35,
            write_secs: 65,
            shutdown_grace_secs: 60,
        }
    }
}

/// Static greeting served under a fixed path prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WelcomeConfig {
    /// Path prefix (plain string prefix match).
    pub path_prefix: String,

    /// Response body.
    pub body: String,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/newf".to_string(),
            body: "Welcome to Newf!".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
