//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServerConfig (host, port, strict_port)
//!     → listener.rs (bind, port fallback)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;

pub use listener::{bind_listener, ListenerError};
