//! Referer-resolving reverse proxy library.

pub mod cli;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use forwarder::Forwarder;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
