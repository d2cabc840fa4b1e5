//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (dispatch)
//!     → matcher.rs (evaluate prefix)
//!     → Target::Welcome | Target::Forward
//! ```
//!
//! # Design Decisions
//! - Built once at startup, immutable at runtime
//! - Deterministic: same input always yields the same target

pub mod matcher;
pub mod router;

pub use router::{Dispatcher, Target};
