//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, body limits)
//! - Detect duplicate or malformed proxy prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use crate::config::env::parse_origin;
use crate::config::schema::DevServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("server.port_attempts must be at least 1")]
    NoPortAttempts,

    #[error("server.max_body_bytes must be non-zero")]
    ZeroBodyLimit,

    #[error("proxy rule prefix '{0}' must start with '/'")]
    RelativePrefix(String),

    #[error("proxy rule prefix '{0}' is declared more than once")]
    DuplicatePrefix(String),

    #[error("proxy.api_base_url: {0}")]
    BaseUrl(String),

    #[error("view.health_path '{0}' must start with '/'")]
    RelativeHealthPath(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &DevServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.server.port_attempts == 0 {
        errors.push(ValidationError::NoPortAttempts);
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut seen = HashSet::new();
    for rule in &config.proxy.rules {
        if !rule.prefix.starts_with('/') {
            errors.push(ValidationError::RelativePrefix(rule.prefix.clone()));
        }
        if !seen.insert(rule.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(rule.prefix.clone()));
        }
    }

    if let Err(e) = parse_origin(&config.proxy.api_base_url) {
        errors.push(ValidationError::BaseUrl(e.to_string()));
    }

    if !config.view.health_path.starts_with('/') {
        errors.push(ValidationError::RelativeHealthPath(config.view.health_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
