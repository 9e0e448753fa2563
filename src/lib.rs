//! Frontend dev server library.
//!
//! Serves the health display page and forwards API paths to a backend origin.

pub mod config;
pub mod http;
pub mod net;
pub mod routing;
pub mod view;
pub mod lifecycle;
pub mod observability;

pub use config::schema::DevServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use view::{HealthOutcome, HealthView};
