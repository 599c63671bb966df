//! Shared handle to the application state
//!
//! The store is the single owner of [`AppState`]. It can be read from:
//! - **Simulator**: checks the auto-answer flag and publishes the call in flight
//! - **UI**: renders from snapshots and subscribes to change events
//! - **Tests**: asserts on snapshots
//!
//! Writes only happen through [`Store::dispatch`]. After each action the
//! persisted fields are written to storage when they changed, and
//! subscribers receive a [`StoreEvent`].

use super::reducer::{reduce, AppAction};
use super::types::{AppState, CallRecord, TrainingData};
use crate::storage::{PersistedState, StateStorage};
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Change notification sent to subscribers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// An action was applied
    StateChanged { action: &'static str },
    /// Saved state was restored from storage
    Hydrated,
}

struct StoreInner {
    state: RwLock<AppState>,
    storage: Option<Arc<dyn StateStorage>>,
    /// Serializes writes to storage so the newest state always lands last
    persist_lock: Mutex<()>,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

/// Cloneable handle to the shared state
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// A store that keeps nothing across restarts
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A store that writes the persisted fields to `storage` after every change
    pub fn with_storage(storage: Arc<dyn StateStorage>) -> Self {
        Self::build(Some(storage))
    }

    fn build(storage: Option<Arc<dyn StateStorage>>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(AppState::new()),
                storage,
                persist_lock: Mutex::new(()),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Restore saved state from storage
    ///
    /// Returns `Ok(true)` if something was restored. Errors leave the
    /// current state untouched.
    pub fn hydrate(&self) -> Result<bool> {
        let Some(storage) = &self.inner.storage else {
            return Ok(false);
        };

        let Some(saved) = storage.load()? else {
            debug!(location = %storage.location(), "no saved state");
            return Ok(false);
        };

        {
            let mut state = self.inner.state.write();
            let current = std::mem::take(&mut *state);
            *state = saved.apply_to(current);
            info!(
                location = %storage.location(),
                training = state.training_data.len(),
                history = state.call_history.len(),
                "restored saved state"
            );
        }
        self.broadcast(StoreEvent::Hydrated);
        Ok(true)
    }

    /// Apply an action, persist if needed and notify subscribers
    pub fn dispatch(&self, action: AppAction) {
        let name = action.name();
        let persist = {
            let mut state = self.inner.state.write();
            let next = reduce(state.clone(), action);
            let persist = next.persisted_fields_differ(&state);
            *state = next;
            persist
        };
        debug!(action = name, persist, "dispatched");

        if persist {
            self.persist();
        }
        self.broadcast(StoreEvent::StateChanged { action: name });
    }

    fn persist(&self) {
        let Some(storage) = &self.inner.storage else {
            return;
        };
        let _guard = self.inner.persist_lock.lock();
        let saved = PersistedState::from_state(&self.inner.state.read());
        if let Err(e) = storage.save(&saved) {
            error!(location = %storage.location(), error = %e, "Error saving state");
        }
    }

    fn broadcast(&self, event: StoreEvent) {
        self.inner
            .subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Receive an event after every change
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.inner.subscribers.lock().push(tx);
        rx
    }

    /// Get a read lock on the state
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, AppState> {
        self.inner.state.read()
    }

    /// Copy of the current state (no lock held after return)
    pub fn snapshot(&self) -> AppState {
        self.inner.state.read().clone()
    }

    // === Convenience read methods ===

    pub fn is_enabled(&self) -> bool {
        self.inner.state.read().is_enabled
    }

    pub fn api_key(&self) -> Option<String> {
        self.inner.state.read().api_key.clone()
    }

    pub fn current_call(&self) -> Option<CallRecord> {
        self.inner.state.read().current_call.clone()
    }

    pub fn call_history(&self) -> Vec<CallRecord> {
        self.inner.state.read().call_history.clone()
    }

    pub fn training_data(&self) -> Vec<TrainingData> {
        self.inner.state.read().training_data.clone()
    }
}
