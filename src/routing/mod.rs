//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate prefix)
//!     → Return: matched ProxyRoute or NoMatch
//!
//! Route Compilation (startup and reload):
//!     ProxyRuleConfig[] + backend origin
//!     → Sort by prefix length
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled up front, immutable at runtime
//! - Deterministic: same input always matches same route
//! - Unmatched paths fall through to the page handler

pub mod matcher;
pub mod router;

pub use router::{ProxyRoute, RouteTable};
