//! Request forwarding to the backend origin.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the backend origin, path preserved
//! - Rewrite `Host` when the rule asks for it
//! - Strip hop-by-hop headers in both directions
//! - Map upstream failures to gateway status codes
//!
//! # Design Decisions
//! - Request bodies are buffered (bounded); response bodies stream through
//! - No retries: a failed upstream call is a 502/504 to the client
//! - Redirects are passed to the client, never followed here

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::routing::ProxyRoute;

/// Headers that only describe the current connection.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwarding failure, rendered as a gateway error.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("upstream request timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("upstream request failed: {0}")]
    Upstream(reqwest::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for ForwardError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ForwardError::Timeout(e)
        } else {
            ForwardError::Upstream(e)
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let message = match self {
            ForwardError::BodyTooLarge { .. } => "Request body too large",
            ForwardError::Timeout(_) => "Upstream request timed out",
            ForwardError::Upstream(_) => "Upstream request failed",
        };
        (self.status(), message).into_response()
    }
}

/// One client per TLS policy. Rules pick by their `secure` flag.
#[derive(Debug, Clone)]
pub struct UpstreamClients {
    verified: reqwest::Client,
    unverified: reqwest::Client,
}

impl UpstreamClients {
    /// Build both clients. `timeout` of `None` keeps the transport default.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            verified: base_builder(timeout).build()?,
            unverified: base_builder(timeout)
                .danger_accept_invalid_certs(true)
                .build()?,
        })
    }

    pub fn for_route(&self, route: &ProxyRoute) -> &reqwest::Client {
        if route.secure {
            &self.verified
        } else {
            &self.unverified
        }
    }
}

fn base_builder(timeout: Option<Duration>) -> reqwest::ClientBuilder {
    let builder = reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none());
    match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

/// Forward `request` along `route` and return the backend's response.
pub async fn forward(
    client: &reqwest::Client,
    route: &ProxyRoute,
    request: Request<Body>,
    max_body_bytes: usize,
) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let target = route.target_uri(&path_and_query);

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        rule = %route.prefix(),
        target = %target,
        "Proxying request"
    );

    match send_upstream(client, route, request, &target, max_body_bytes).await {
        Ok(response) => {
            metrics::record_proxied_request(route.prefix(), response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, target = %target, error = %e, "Upstream error");
            metrics::record_proxied_request(route.prefix(), e.status().as_u16(), start_time);
            e.into_response()
        }
    }
}

async fn send_upstream(
    client: &reqwest::Client,
    route: &ProxyRoute,
    request: Request<Body>,
    target: &str,
    max_body_bytes: usize,
) -> Result<Response, ForwardError> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|_| ForwardError::BodyTooLarge { limit: max_body_bytes })?;

    let mut headers = strip_hop_by_hop(&parts.headers);
    headers.remove(header::CONTENT_LENGTH);
    if route.change_origin {
        if let Ok(host) = HeaderValue::from_str(route.authority()) {
            headers.insert(header::HOST, host);
        }
    }

    let upstream = client
        .request(parts.method, target)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let headers = strip_hop_by_hop(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Copy `headers` without hop-by-hop entries, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let connection_listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if HOP_BY_HOP.contains(name) || connection_listed.iter().any(|n| n == name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}
