//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive, plain string prefix)
//!
//! # Design Decisions
//! - `/newf` matches `/newf`, `/newf/x` and `/newfoo` alike
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::default()).unwrap()
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/newf");

        assert!(matcher.matches(&request("http://example.com/newf")));
        assert!(matcher.matches(&request("/newf/hello")));
        assert!(matcher.matches(&request("/newfoo")));
        assert!(!matcher.matches(&request("/images/newf")));
        assert!(!matcher.matches(&request("/NEWF"))); // Case sensitive
    }
}
