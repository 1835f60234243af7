//! Error types for the proxy pipeline.
//!
//! # Responsibilities
//! - Distinguish the three terminal failure kinds (invalid target, upstream
//!   failure, oversized body)
//! - Map each to an observable HTTP response; nothing escapes the handler
//!
//! # Design Decisions
//! - "No target" is not an error: the resolver returns it as a resolution
//!   outcome and the caller renders the home page with a 200
//! - No failure is retried; the end user retries manually

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Terminal per-request failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The candidate looked like an absolute URL but did not parse as one.
    #[error("invalid target URL: {0}")]
    InvalidTarget(String),

    /// Network or protocol failure contacting the target. Single attempt,
    /// fail fast, surface the reason.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Inbound body exceeded the configured buffering limit.
    #[error("request body too large")]
    BodyTooLarge,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_target_maps_to_400() {
        let err = ProxyError::InvalidTarget("http://bad url".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("http://bad url"));
    }
}
