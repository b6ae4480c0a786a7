//! Per-placeholder render state machine.
//!
//! ```text
//! Pending ──▶ Queued ──▶ Rendering ──▶ Rendered
//!                                 └──▶ Failed
//! ```
//!
//! `Rendered` and `Failed` are terminal. There are no retries.

use std::fmt;

/// Render state of a single placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    /// Discovered, not yet near the viewport.
    #[default]
    Pending,
    /// Visible; waiting for the render call (or the image load) to start.
    Queued,
    /// Render call issued.
    Rendering,
    Rendered,
    Failed,
}

impl RenderState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rendered | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Queued)
                | (Self::Queued, Self::Rendering)
                | (Self::Rendering, Self::Rendered | Self::Failed)
        )
    }

    /// Move to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: Self) -> Result<(), TransitionError> {
        if !self.can_transition_to(next) {
            return Err(TransitionError {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::Rendering => "rendering",
            Self::Rendered => "rendered",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Rejected state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal render state transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: RenderState,
    pub to: RenderState,
}
