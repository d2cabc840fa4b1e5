//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper-util connection, header read timeout)
//!     → request.rs (request id)
//!     → routing (welcome prefix or forward)
//!     → forwarder (upstream round trip)
//!     → response.rs (errors → status codes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
