//! Health display view.
//!
//! # Data Flow
//! ```text
//! mount()
//!     → spawn one check (probe.rs)
//!     → interpret body (state.rs)
//!     → publish Settled(outcome) once
//!     → page.rs renders the current state
//! ```
//!
//! # Design Decisions
//! - One request per mount; reading or rendering never issues another
//! - Failures never escape the view: they become "unreachable"
//! - Unmounting drops the receiver; a late result is silently discarded

pub mod page;
pub mod probe;
pub mod state;

use tokio::sync::watch;

use crate::observability::metrics;

pub use page::{render_closing, render_opening, render_page, PageContext};
pub use probe::{HealthProbe, HttpHealthProbe, ProbeError};
pub use state::{interpret, HealthDisplay, HealthOutcome};

/// A mounted health display. Owns the only copy of its state.
#[derive(Debug)]
pub struct HealthView {
    state: watch::Receiver<HealthDisplay>,
}

impl HealthView {
    /// Mount the view and start its single health check.
    ///
    /// Must be called within a Tokio runtime.
    pub fn mount<P: HealthProbe>(probe: P) -> Self {
        let (tx, rx) = watch::channel(HealthDisplay::Pending);

        tokio::spawn(async move {
            let outcome = interpret(probe.check().await);
            tracing::debug!(display = %outcome, "Health view settled");
            metrics::record_view_settled(outcome.label());
            // Fails only when the view is gone; the result is dropped with it.
            let _ = tx.send(HealthDisplay::Settled(outcome));
        });

        Self { state: rx }
    }

    /// Mount a view whose health path has nowhere to go. Settles immediately.
    pub fn mount_unroutable() -> Self {
        let (_tx, rx) = watch::channel(HealthDisplay::Settled(HealthOutcome::Unreachable));
        metrics::record_view_settled(HealthOutcome::Unreachable.label());
        Self { state: rx }
    }

    /// Current display state.
    pub fn current(&self) -> HealthDisplay {
        self.state.borrow().clone()
    }

    /// Wait until the check has resolved.
    pub async fn settled(&mut self) -> HealthOutcome {
        match self.state.wait_for(HealthDisplay::is_settled).await {
            Ok(display) => display.outcome().cloned().unwrap_or(HealthOutcome::Unreachable),
            // The check task ended without publishing.
            Err(_) => HealthOutcome::Unreachable,
        }
    }

    /// Tear the view down.
    pub fn unmount(self) {}
}
