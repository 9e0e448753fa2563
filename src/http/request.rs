//! Request identification.
//!
//! # Responsibilities
//! - Generate a UUID request ID for every incoming request
//! - Echo the ID on the response and forward it upstream
//! - Attach the ID to the per-request tracing span
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept as is

use axum::http::{HeaderName, Request};
use tracing::Span;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Read access to the request ID set by the request-id layer.
pub trait RequestIdExt {
    /// The request ID, or `"unknown"` if none was assigned.
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Span for `TraceLayer`, tagged with the request ID.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request.request_id(),
        method = %request.method(),
        uri = %request.uri(),
    )
}
