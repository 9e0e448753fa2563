//! The single outbound health request.

use std::future::Future;

use reqwest::header::ACCEPT;
use serde_json::Value;

/// Why a health check produced no parsed body.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("health request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("health response is not JSON: {0}")]
    Body(#[from] serde_json::Error),
}

/// Issues one read-only health request and returns the parsed body.
pub trait HealthProbe: Send + Sync + 'static {
    fn check(&self) -> impl Future<Output = Result<Value, ProbeError>> + Send;
}

/// `GET <url>` over HTTP(S).
///
/// The status code is not inspected: an error response with a JSON body
/// still yields that body.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpHealthProbe {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HealthProbe for HttpHealthProbe {
    fn check(&self) -> impl Future<Output = Result<Value, ProbeError>> + Send {
        async move {
            let response = self
                .client
                .get(&self.url)
                .header(ACCEPT, "application/json")
                .send()
                .await?;
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        }
    }
}
