//! Transient user-visible notices for clipboard and download actions.

use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// A single on-screen notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub expires_at: Instant,
}

/// Queue of notices waiting for the host to display or expire them.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(message, Instant::now());
    }

    pub(crate) fn push_at(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        tracing::debug!(%message, "Notification");
        self.queue.push(Notification {
            message,
            expires_at: now + NOTIFICATION_TTL,
        });
    }

    /// Messages still visible at `now`, oldest first.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &str> {
        self.queue
            .iter()
            .filter(move |n| n.expires_at > now)
            .map(|n| n.message.as_str())
    }

    /// Drop notices whose TTL has passed.
    pub fn expire(&mut self, now: Instant) {
        self.queue.retain(|n| n.expires_at > now);
    }

    /// Hand every queued notice to the host.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }

    /// Most recent message, expired or not.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.queue.last().map(|n| n.message.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
