//! Referer-aware forwarding to a single upstream.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → path.rs (Referer path + request path → upstream path)
//!     → relay.rs (build outbound request, execute with timeout)
//!     → headers.rs (same copy policy in both directions)
//!     → relay.rs (status + streamed body back to client)
//! ```
//!
//! # Design Decisions
//! - Upstream is parsed once; `host:port` always has a port
//! - Multi-value headers collapse to the last value
//! - Errors are returned, never panicked; the HTTP layer maps them

pub mod headers;
pub mod path;
pub mod relay;
pub mod upstream;

pub use headers::copy_headers;
pub use path::resolve_path;
pub use relay::{relay_response, Forwarder};
pub use upstream::UpstreamAddr;
