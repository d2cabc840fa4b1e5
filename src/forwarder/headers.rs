//! Header copy policy.
//!
//! The same filter is applied to request headers sent upstream and to
//! response headers sent back to the client:
//!
//! - empty values are skipped with a warning
//! - `Connection` is hop-by-hop and never copied
//! - `Accept-Encoding` is never copied; upstream bodies are relayed as-is
//!   and the proxy does not decode compressed representations
//! - everything else is *set* in the destination, so a header with several
//!   values collapses to the last one; earlier values, including the first,
//!   are dropped

use axum::http::header::{self, HeaderMap, HeaderName};

/// Headers dropped in both directions.
pub const SKIPPED_HEADERS: &[HeaderName] = &[header::CONNECTION, header::ACCEPT_ENCODING];

/// Returns true if `name` is never copied.
pub fn is_skipped(name: &HeaderName) -> bool {
    SKIPPED_HEADERS.contains(name)
}

/// Copy `src` into `dst` under the filter above.
pub fn copy_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for name in src.keys() {
        let Some(value) = src.get_all(name).iter().last() else {
            continue;
        };
        if value.is_empty() {
            tracing::warn!(header = %name, "skipping header with empty value");
            continue;
        }

        if is_skipped(name) {
            continue;
        }

        dst.insert(name.clone(), value.clone());
    }
}
