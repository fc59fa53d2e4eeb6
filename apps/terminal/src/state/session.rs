//! # Session State
//!
//! The orders open on this terminal and the add-item dialog.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionState                                                          │
//! │  ├── registry:  Arc<Mutex<OrderRegistry>>                               │
//! │  └── selection: Arc<Mutex<ItemSelection>>                               │
//! │                                                                         │
//! │  Locks are held for one synchronous step and never across an .await.   │
//! │  When both are needed, selection is locked before registry.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use payshia_core::{ItemSelection, OrderRegistry};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    registry: Arc<Mutex<OrderRegistry>>,
    selection: Arc<Mutex<ItemSelection>>,
}

impl SessionState {
    /// Starts a session with one empty order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: OrderRegistry) -> Self {
        SessionState {
            registry: Arc::new(Mutex::new(registry)),
            selection: Arc::default(),
        }
    }

    /// The registry mutex itself, for checkout to lock around its network call.
    pub fn registry(&self) -> &Mutex<OrderRegistry> {
        &self.registry
    }

    /// Executes a function with read access to the registry.
    pub fn with_registry<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&OrderRegistry) -> R,
    {
        let registry = lock(&self.registry);
        f(&registry)
    }

    /// Executes a function with write access to the registry.
    pub fn with_registry_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut OrderRegistry) -> R,
    {
        let mut registry = lock(&self.registry);
        f(&mut registry)
    }

    pub fn with_selection_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ItemSelection) -> R,
    {
        let mut selection = lock(&self.selection);
        f(&mut selection)
    }

    /// Runs `f` with the dialog and the registry both locked.
    pub fn with_selection_and_registry<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ItemSelection, &mut OrderRegistry) -> R,
    {
        let mut selection = lock(&self.selection);
        let mut registry = lock(&self.registry);
        f(&mut selection, &mut registry)
    }
}

/// A panic mid-mutation leaves the order as the last completed step wrote
/// it, since every mutation validates before writing.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_current_order() {
        let session = SessionState::new();
        let name = session.with_registry(|r| r.current().map(|o| o.name().to_string()));
        assert_eq!(name.unwrap(), "Order 1");
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionState::new();
        let other = session.clone();

        other.with_registry_mut(|r| r.create_order());

        assert_eq!(session.with_registry(|r| r.len()), 2);
    }
}
