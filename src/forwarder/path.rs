//! Referer-relative path resolution.
//!
//! Some clients fetch a resource by its last path segment and rely on the
//! page that referenced it to supply the rest. The upstream path is rebuilt
//! from the Referer's path and the request path:
//!
//! - Referer path ends in `/`: the request path is used unchanged.
//! - Otherwise: Referer path + request path, concatenated byte for byte.
//!   No separator is inserted and duplicate slashes are kept.
//!
//! The Referer may be an absolute URI or an absolute path. Its path is taken
//! as sent: dot segments and percent-escapes are left alone.

use axum::http::Uri;

use crate::config::MissingRefererPolicy;
use crate::error::ForwardError;

/// Compute the upstream path for a request.
pub fn resolve_path(
    referer: Option<&str>,
    request_path: &str,
    missing: MissingRefererPolicy,
) -> Result<String, ForwardError> {
    let referer = match referer {
        Some(referer) => referer,
        None => {
            return match missing {
                MissingRefererPolicy::Reject => Err(ForwardError::MissingReferer),
                MissingRefererPolicy::UseRequestPath => Ok(request_path.to_string()),
            }
        }
    };

    let parsed = Uri::try_from(referer).map_err(|source| ForwardError::InvalidReferer {
        referer: referer.to_string(),
        source,
    })?;

    // A bare `host[:port]` parses as authority-form and carries no path.
    if parsed.scheme().is_none() && parsed.authority().is_some() {
        return Err(ForwardError::RefererWithoutPath(referer.to_string()));
    }

    Ok(join_referer_path(parsed.path(), request_path))
}

/// Join an already-extracted Referer path with the request path.
pub fn join_referer_path(referer_path: &str, request_path: &str) -> String {
    if referer_path.ends_with('/') {
        request_path.to_string()
    } else {
        let mut resolved = String::with_capacity(referer_path.len() + request_path.len());
        resolved.push_str(referer_path);
        resolved.push_str(request_path);
        resolved
    }
}
