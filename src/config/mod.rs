//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DevServerConfig (validated, immutable)
//!
//! .env files + process environment
//!     → env.rs (layered lookup)
//!     → backend origin (env override or configured default)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps its route table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults so the server runs without a config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use env::{resolve_backend_origin, EnvLayer, DEFAULT_MODE};
pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    DevServerConfig, ObservabilityConfig, ProxyRuleConfig, ProxySettings, ServerConfig,
    ViewConfig,
};
