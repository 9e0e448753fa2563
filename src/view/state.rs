//! Health display state machine.
//!
//! # States
//! - Pending: check in flight, sentinel text shown
//! - Settled: terminal, one of the three outcomes shown
//!
//! # State Transitions
//! ```text
//! Pending → Settled(outcome): the single health check resolves (ok or not)
//! ```
//! There is no transition back to Pending.

use std::fmt;

use serde_json::Value;

use crate::view::probe::ProbeError;

/// Text shown while the check is in flight.
pub const PENDING_TEXT: &str = "checking...";

/// Text shown when the backend answered without a usable `status`.
pub const UNKNOWN_TEXT: &str = "unknown";

/// Text shown when the check failed in any way.
pub const UNREACHABLE_TEXT: &str = "unreachable";

/// Final result of a health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthOutcome {
    /// Backend-provided `status` value.
    Status(String),
    /// Parsed body had no usable `status`.
    Unknown,
    /// Transport or parse failure.
    Unreachable,
}

impl HealthOutcome {
    /// Low-cardinality label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            HealthOutcome::Status(_) => "status",
            HealthOutcome::Unknown => "unknown",
            HealthOutcome::Unreachable => "unreachable",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HealthOutcome::Status(s) => s,
            HealthOutcome::Unknown => UNKNOWN_TEXT,
            HealthOutcome::Unreachable => UNREACHABLE_TEXT,
        }
    }
}

impl fmt::Display for HealthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the view currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthDisplay {
    Pending,
    Settled(HealthOutcome),
}

impl HealthDisplay {
    pub fn is_settled(&self) -> bool {
        matches!(self, HealthDisplay::Settled(_))
    }

    pub fn outcome(&self) -> Option<&HealthOutcome> {
        match self {
            HealthDisplay::Pending => None,
            HealthDisplay::Settled(outcome) => Some(outcome),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HealthDisplay::Pending => PENDING_TEXT,
            HealthDisplay::Settled(outcome) => outcome.as_str(),
        }
    }
}

impl fmt::Display for HealthDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map the result of a health check onto an outcome.
///
/// A `null` body counts as a failure: there is no object to read `status`
/// from. Any other non-object body simply has no `status`.
pub fn interpret(result: Result<Value, ProbeError>) -> HealthOutcome {
    match result {
        Err(_) | Ok(Value::Null) => HealthOutcome::Unreachable,
        Ok(Value::Object(body)) => match body.get("status") {
            Some(Value::String(s)) if !s.is_empty() => HealthOutcome::Status(s.clone()),
            Some(value) if is_truthy(value) => HealthOutcome::Status(value.to_string()),
            _ => HealthOutcome::Unknown,
        },
        Ok(_) => HealthOutcome::Unknown,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
