//! Cache invalidation notices.
//!
//! Readers that cache balances or requests subscribe to the bus and drop the
//! affected entries when a notice arrives. Notices are published only after a
//! mutation has committed.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::BalanceKey;

/// Default number of notices buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Identifies a record whose cached copies are stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Invalidation {
    /// A balance row changed.
    Balance {
        /// The row's key.
        key: BalanceKey,
    },
    /// A leave request changed status or was created.
    LeaveRequest {
        /// The request's id.
        id: Uuid,
    },
    /// A comp-off grant was created or applied.
    CompOff {
        /// The grant's id.
        id: Uuid,
    },
    /// A leave policy was created or deactivated.
    Policy {
        /// The policy's id.
        id: Uuid,
    },
}

/// Broadcast channel carrying [`Invalidation`] notices.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    /// Creates a bus buffering up to `capacity` notices per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a receiver for every notice published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }

    /// Publishes a notice. Having no subscribers is not an error.
    pub fn publish(&self, notice: Invalidation) {
        debug!(?notice, "Publishing invalidation");
        let _ = self.sender.send(notice);
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
