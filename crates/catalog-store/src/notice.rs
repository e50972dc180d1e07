//! Transient user notifications
//!
//! Notices are fire-and-forget: a notice sent while nobody listens is
//! dropped, and a slow listener loses the oldest ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Notice importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// An operation completed
    Success,
    /// An operation failed
    Error,
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Importance
    pub severity: Severity,
    /// User-facing text
    pub message: String,
}

impl Notice {
    /// Success notice
    #[inline]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// Error notice
    #[inline]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Broadcast handle shared by the store and the views
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    /// Create a notifier buffering `capacity` notices per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a notice
    pub fn notify(&self, notice: Notice) {
        tracing::debug!(severity = ?notice.severity, message = %notice.message, "notice");
        // No subscribers is not an error.
        let _ = self.tx.send(notice);
    }

    /// Receive notices published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(32)
    }
}
