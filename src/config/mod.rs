//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → command-line overrides (cli.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ListenerConfig;
pub use schema::MissingRefererPolicy;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::TimeoutConfig;
pub use schema::UpstreamConfig;
pub use schema::WelcomeConfig;
