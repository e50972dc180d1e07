//! Per-resource fetch state machine
//!
//! ```text
//! Idle ──► Fetching ──► Settled(Ok | Err)
//!            │  ▲            │
//!            │  └────────────┘
//!            └──► previous phase (fetch abandoned)
//! ```
//!
//! `Fetching -> Fetching` is illegal, which is what rejects a second fetch
//! of the same kind while one is in flight.

use catalog_client::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two collections held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Category collection
    Categories,
    /// Product collection
    Products,
}

impl ResourceKind {
    /// Every kind, in display order
    pub const ALL: [Self; 2] = [Self::Categories, Self::Products];

    /// Lowercase plural label
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Products => "products",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of the fetches of one resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Never fetched
    #[default]
    Idle,
    /// A list request is in flight
    Fetching,
    /// The last fetch completed
    Settled(Result<(), ErrorKind>),
}

impl FetchPhase {
    /// Whether a request is in flight
    #[inline]
    #[must_use]
    pub fn is_fetching(self) -> bool {
        matches!(self, Self::Fetching)
    }

    /// Whether the last fetch failed
    #[inline]
    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Settled(Err(_)))
    }
}

/// Rejected phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal {kind} fetch transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    /// Resource whose phase was changing
    pub kind: ResourceKind,
    /// Phase before the change
    pub from: FetchPhase,
    /// Requested phase
    pub to: FetchPhase,
}

/// Validates a phase transition
///
/// # Errors
/// `TransitionError` when `from -> to` is not an edge of the machine.
pub fn validate_transition(
    kind: ResourceKind,
    from: FetchPhase,
    to: FetchPhase,
) -> Result<(), TransitionError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError { kind, from, to })
    }
}

fn allowed(from: FetchPhase, to: FetchPhase) -> bool {
    use FetchPhase::{Fetching, Idle, Settled};
    matches!(
        (from, to),
        (Idle | Settled(_), Fetching) | (Fetching, Idle | Settled(_))
    )
}
