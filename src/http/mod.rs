//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → routing table lookup
//!         ├─ prefix match → forward.rs (rewrite, send upstream, stream back)
//!         ├─ HTML navigation → health view mounted and rendered
//!         └─ otherwise → 404
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use forward::{ForwardError, UpstreamClients};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{ConfigReloader, HttpServer, ServerError};
