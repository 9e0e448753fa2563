//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Origin used when neither the environment nor the config file names one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Environment variable that overrides the backend origin.
pub const DEFAULT_API_BASE_URL_ENV: &str = "VITE_API_BASE_URL";

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DevServerConfig {
    /// Listener configuration (host, port, port fallback).
    pub server: ServerConfig,

    /// Proxy rules mapping path prefixes to the backend origin.
    pub proxy: ProxySettings,

    /// Health display page settings.
    pub view: ViewConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind. `0.0.0.0` exposes the server on every interface.
    pub host: String,

    /// Preferred port.
    pub port: u16,

    /// Fail instead of trying the next port when `port` is taken.
    pub strict_port: bool,

    /// How many consecutive ports to try when `strict_port` is off.
    pub port_attempts: u16,

    /// Maximum buffered request body forwarded upstream.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5173,
            strict_port: false,
            port_attempts: 10,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxySettings {
    /// Backend origin used when `env_var` is unset.
    pub api_base_url: String,

    /// Name of the environment variable carrying the backend origin.
    pub env_var: String,

    /// Path prefixes forwarded to the backend.
    pub rules: Vec<ProxyRuleConfig>,

    /// Upstream request timeout. `None` leaves it to the transport.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            env_var: DEFAULT_API_BASE_URL_ENV.to_string(),
            rules: vec![ProxyRuleConfig::new("/api"), ProxyRuleConfig::new("/health")],
            request_timeout_secs: None,
        }
    }
}

/// A single prefix rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProxyRuleConfig {
    /// Path prefix to match (case-sensitive).
    pub prefix: String,

    /// Rewrite the `Host` header to the backend authority.
    #[serde(default = "default_true")]
    pub change_origin: bool,

    /// Verify the backend's TLS certificate chain.
    #[serde(default)]
    pub secure: bool,
}

impl ProxyRuleConfig {
    /// Rule with the local development defaults: origin rewritten, TLS unverified.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            change_origin: true,
            secure: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Health display page configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Page heading.
    pub title: String,

    /// Path the view checks on mount.
    pub health_path: String,

    /// API path suggested in the usage hint.
    pub api_hint_path: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "Hackathon Frontend".to_string(),
            health_path: "/health".to_string(),
            api_hint_path: "/api/v1".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
