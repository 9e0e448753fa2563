//! TCP listener binding with port fallback.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - When the port is taken and `strict_port` is off, walk up to the next free port
//! - Surface bind errors with the address that failed

use std::io::ErrorKind;
use tokio::net::TcpListener;

use crate::config::ServerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    /// Every candidate port was taken.
    #[error("No free port in {first}..={last} on {host}")]
    Exhausted { host: String, first: u16, last: u16 },
}

/// Bind the dev server listener.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, ListenerError> {
    let attempts = if config.strict_port { 1 } else { config.port_attempts.max(1) };
    let mut last = config.port;

    for offset in 0..attempts {
        let Some(port) = config.port.checked_add(offset) else {
            break;
        };
        last = port;
        let address = format!("{}:{}", config.host, port);

        match TcpListener::bind(&address).await {
            Ok(listener) => {
                if port != config.port {
                    tracing::warn!(
                        requested = config.port,
                        port,
                        "Port in use, using the next free port"
                    );
                }
                tracing::info!(address = %address, "Listener bound");
                return Ok(listener);
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse && !config.strict_port => {
                tracing::debug!(address = %address, "Port in use, trying next");
            }
            Err(source) => return Err(ListenerError::Bind { address, source }),
        }
    }

    Err(ListenerError::Exhausted {
        host: config.host.clone(),
        first: config.port,
        last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn occupied() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    fn server_config(port: u16, strict_port: bool) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".into(),
            port,
            strict_port,
            port_attempts: 20,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn falls_through_to_next_port() {
        let (_held, port) = occupied().await;
        if port == u16::MAX {
            return;
        }

        let listener = bind_listener(&server_config(port, false)).await.unwrap();
        assert!(listener.local_addr().unwrap().port() > port);
    }

    #[tokio::test]
    async fn strict_port_fails_fast() {
        let (_held, port) = occupied().await;

        let err = bind_listener(&server_config(port, true)).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }

    #[tokio::test]
    async fn invalid_host_is_bind_error() {
        let mut config = server_config(5173, false);
        config.host = "not a host".into();
        let err = bind_listener(&config).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }
}
