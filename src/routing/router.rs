//! Request dispatch.
//!
//! # Responsibilities
//! - Send requests under the welcome prefix to the static greeting
//! - Send everything else to the forwarder
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Welcome prefix is checked first; forwarding is the catch-all

use axum::body::Body;
use axum::http::Request;

use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// Where a request should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Welcome,
    Forward,
}

/// Chooses a [`Target`] for each request.
#[derive(Debug)]
pub struct Dispatcher {
    welcome: Box<dyn Matcher>,
}

impl Dispatcher {
    pub fn new(welcome_prefix: impl Into<String>) -> Self {
        Self {
            welcome: Box::new(PathPrefixMatcher::new(welcome_prefix)),
        }
    }

    pub fn dispatch(&self, req: &Request<Body>) -> Target {
        if self.welcome.matches(req) {
            Target::Welcome
        } else {
            Target::Forward
        }
    }
}
