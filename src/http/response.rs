//! Client-facing responses.
//!
//! Forwarding failures become proper HTTP errors instead of dropped
//! connections:
//!
//! | error | status |
//! |---|---|
//! | missing / unparseable Referer | 400 |
//! | upstream URI or request construction | 500 |
//! | upstream transport failure | 502 |
//! | upstream timeout | 504 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::ForwardError;

impl ForwardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::MissingReferer
            | ForwardError::InvalidReferer { .. }
            | ForwardError::RefererWithoutPath(_) => StatusCode::BAD_REQUEST,
            ForwardError::InvalidUpstreamUri { .. } | ForwardError::BuildRequest(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ForwardError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn client_message(&self) -> &'static str {
        match self {
            ForwardError::MissingReferer => "Missing Referer header",
            ForwardError::InvalidReferer { .. } | ForwardError::RefererWithoutPath(_) => {
                "Invalid Referer header"
            }
            ForwardError::InvalidUpstreamUri { .. } | ForwardError::BuildRequest(_) => {
                "Failed to build upstream request"
            }
            ForwardError::Upstream(_) => "Upstream request failed",
            ForwardError::UpstreamTimeout(_) => "Upstream timed out",
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (self.status_code(), self.client_message()).into_response()
    }
}

/// Static greeting.
pub fn welcome_response(body: &str) -> Response {
    (StatusCode::OK, body.to_string()).into_response()
}
