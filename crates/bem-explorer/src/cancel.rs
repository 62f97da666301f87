//! Cancellation tokens for entity walks.
//!
//! A walk can run for a long time on large level sets. Every suspension point
//! in the walker and aggregator checks a [`CancellationToken`]; bumping the
//! shared version through [`WalkVersionTracker::cancel_all`] makes every
//! outstanding token report cancellation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tracks the active walk version.
///
/// Tokens created for an older version report as cancelled once the version
/// has moved on.
#[derive(Debug, Clone, Default)]
pub struct WalkVersionTracker {
    active_version: Arc<AtomicU64>,
}

impl WalkVersionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current active version without incrementing.
    pub fn current_version(&self) -> u64 {
        self.active_version.load(Ordering::SeqCst)
    }

    /// Increments the active version, cancelling every token issued so far.
    ///
    /// Returns the new active version.
    pub fn cancel_all(&self) -> u64 {
        self.active_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Creates a token bound to the current version.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            active_version: Some(self.active_version.clone()),
            version: self.current_version(),
        }
    }
}

/// A cancellation token for terminating long-running walks.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    /// `None` for tokens that can never be cancelled.
    active_version: Option<Arc<AtomicU64>>,
    version: u64,
}

impl CancellationToken {
    /// Creates a cancellation token that is never cancelled.
    #[inline]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Checks if this token is still active.
    ///
    /// Returns `Some(())` if still active, `None` if cancelled.
    /// This enables use with the `?` operator for early returns.
    #[inline]
    pub fn is_cancelled(&self) -> Option<()> {
        match &self.active_version {
            Some(active) if active.load(Ordering::Relaxed) != self.version => None,
            _ => Some(()),
        }
    }

    /// Boolean form of [`is_cancelled`](Self::is_cancelled).
    #[inline]
    pub fn cancelled(&self) -> bool {
        self.is_cancelled().is_none()
    }
}
