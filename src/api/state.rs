//! Application state for the leave ledger API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::error::LedgerResult;
use crate::ledger::Ledger;

/// Shared application state.
///
/// Every handler works against the same [`Ledger`]; cloning the state only
/// clones the handle.
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Ledger>,
}

impl AppState {
    /// Creates a new application state around the given ledger.
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }

    /// Builds a seeded ledger from loaded configuration.
    pub fn from_config(loader: &ConfigLoader) -> LedgerResult<Self> {
        Ok(Self::new(loader.build_ledger()?))
    }

    /// Returns a reference to the ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_ledger() {
        let state = AppState::new(Ledger::default());
        let other = state.clone();
        assert!(std::ptr::eq(state.ledger(), other.ledger()));
    }
}
