//! Error types for the proxy.
//!
//! Startup errors (`UpstreamAddrError`, `ConfigError`, `ServerError`) are
//! fatal and surface from `main` with a non-zero exit. `ForwardError` is
//! scoped to a single request and is turned into an HTTP response at the
//! handler boundary (see `http::response`).

use std::time::Duration;

use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::net::ListenerError;

/// Why an upstream address could not be split into host and port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamAddrError {
    #[error("upstream cannot be empty")]
    Empty,

    #[error("missing host in address {0:?}")]
    MissingHost(String),

    #[error("too many colons in address {0:?}")]
    TooManyColons(String),

    #[error("missing ']' in address {0:?}")]
    MissingBracket(String),

    #[error("unexpected '[' or ']' in address {0:?}")]
    UnexpectedBracket(String),

    #[error("invalid port {port:?} in address {addr:?}")]
    InvalidPort { addr: String, port: String },
}

/// Per-request forwarding failures.
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("request has no Referer header")]
    MissingReferer,

    #[error("invalid Referer {referer:?}: {source}")]
    InvalidReferer {
        referer: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("Referer {0:?} has no path")]
    RefererWithoutPath(String),

    #[error("invalid upstream URI {uri:?}: {source}")]
    InvalidUpstreamUri {
        uri: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("failed to build upstream request: {0}")]
    BuildRequest(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),
}

impl ForwardError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::MissingReferer => "missing_referer",
            ForwardError::InvalidReferer { .. } => "invalid_referer",
            ForwardError::RefererWithoutPath(_) => "referer_without_path",
            ForwardError::InvalidUpstreamUri { .. } => "invalid_upstream_uri",
            ForwardError::BuildRequest(_) => "build_request",
            ForwardError::Upstream(_) => "upstream",
            ForwardError::UpstreamTimeout(_) => "upstream_timeout",
        }
    }
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Server lifecycle failures.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("in-flight requests did not finish within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
