//! Application facade
//!
//! Bundles the store, the call simulator and the permission probe behind
//! the handful of actions a front end invokes: toggling auto-answer,
//! saving the API key, managing training data and simulating a call.
//! Every action reports back through the [`Notifier`].

use crate::integration::config::WhispererConfig;
use crate::notify::{Notice, Notifier};
use crate::service::{setup_realtime_connection, MicrophoneAccess, PermissionProbe};
use crate::simulator::{CallOutcome, CallSimulator};
use crate::state::{AppAction, RealtimeConfigUpdate, Store, TrainingData};
use crate::storage::{FileStorage, StateStorage};
use crate::{Result, WhispererError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const PERMISSION_DENIED_NOTICE: &str = "Call permission denied. Please grant permissions in settings.";

/// Handle for driving the application from a front end
#[derive(Clone)]
pub struct CallWhisperer {
    /// Shared application state
    store: Store,

    /// Where user-facing notices go
    notifier: Arc<dyn Notifier>,

    /// Incoming call driver
    simulator: CallSimulator,

    /// Call permission stub
    permission: PermissionProbe,

    /// Last permission check result; `None` while unchecked
    permissions_granted: Arc<RwLock<Option<bool>>>,
}

impl CallWhisperer {
    /// Build from configuration, choosing the storage backend it names
    pub fn new(config: &WhispererConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        config.validate().map_err(WhispererError::ConfigError)?;

        let store = match config.resolved_storage_path() {
            Some(path) => {
                info!(path = %path.display(), "Using file storage");
                let storage: Arc<dyn StateStorage> = Arc::new(FileStorage::new(path));
                Store::with_storage(storage)
            }
            None if config.in_memory => {
                info!("Using in-memory state");
                Store::new()
            }
            None => {
                warn!("No data directory available, state will not be saved");
                Store::new()
            }
        };

        Ok(Self::with_store(config, store, notifier))
    }

    /// Build around an existing store
    pub fn with_store(config: &WhispererConfig, store: Store, notifier: Arc<dyn Notifier>) -> Self {
        let simulator = CallSimulator::new(store.clone(), Arc::clone(&notifier))
            .with_mode(config.mode)
            .with_timings(config.timings)
            .with_microphone(MicrophoneAccess::new(config.microphone_granted));

        Self {
            store,
            notifier,
            simulator,
            permission: PermissionProbe::new(config.permission, config.timings.permission()),
            permissions_granted: Arc::new(RwLock::new(None)),
        }
    }

    /// Restore saved state
    ///
    /// A load failure is reported and the app continues with defaults.
    pub fn start(&self) -> bool {
        match self.store.hydrate() {
            Ok(restored) => restored,
            Err(e) => {
                error!(error = %e, "Error loading saved state");
                self.notifier.notify(
                    Notice::error("Error loading saved data")
                        .with_description("Your previous settings could not be loaded."),
                );
                false
            }
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn simulator(&self) -> &CallSimulator {
        &self.simulator
    }

    /// Result of the last permission check
    pub fn permissions_granted(&self) -> Option<bool> {
        *self.permissions_granted.read()
    }

    /// Whether the simulate action is available right now
    ///
    /// Only auto-answer and the call in flight gate it; a missing API key is
    /// reported by the simulation itself.
    pub fn can_simulate(&self) -> bool {
        let state = self.store.read();
        state.is_enabled && state.current_call.is_none() && !self.simulator.is_busy()
    }

    /// Flip the auto-answer switch
    ///
    /// Enabling runs the call permission check; if it does not pass the
    /// switch is turned back off. Returns the resulting switch position.
    pub async fn set_auto_answer(&self, enabled: bool) -> bool {
        self.store.dispatch(AppAction::SetEnabled(enabled));
        if enabled {
            self.notifier.notify(
                Notice::success("Call Whisperer Activated")
                    .with_description("The app will now answer incoming calls automatically."),
            );
        } else {
            self.notifier.notify(
                Notice::info("Call Whisperer Deactivated")
                    .with_description("You will need to answer calls manually."),
            );
            return false;
        }

        let granted = match self.permission.check_call_permissions().await {
            Ok(granted) => granted,
            Err(e) => {
                error!(error = %e, "Error checking permissions");
                false
            }
        };
        *self.permissions_granted.write() = Some(granted);

        if !granted {
            self.store.dispatch(AppAction::SetEnabled(false));
            self.notifier.notify(Notice::error(PERMISSION_DENIED_NOTICE));
            return false;
        }
        info!("Call permissions granted");

        // Switched off again while the check was pending
        if !self.store.is_enabled() {
            return false;
        }

        self.prepare_realtime();
        true
    }

    /// Seed the realtime settings with the API key and open a test connection
    fn prepare_realtime(&self) {
        let state = self.store.snapshot();
        let Some(api_key) = state.api_key.clone() else {
            debug!("No API key yet, skipping realtime setup");
            return;
        };

        if state.realtime_config.api_key.is_none() {
            self.store
                .dispatch(AppAction::SetRealtimeConfig(RealtimeConfigUpdate {
                    api_key: Some(api_key),
                    ..Default::default()
                }));
        }

        let config = self.store.read().effective_realtime_config();
        if let Err(e) = setup_realtime_connection(&config) {
            warn!(error = %e, "Realtime setup failed");
        }
    }

    pub fn save_api_key(&self, key: impl Into<String>) {
        self.store.dispatch(AppAction::SetApiKey(Some(key.into())));
        self.notifier.notify(Notice::success("API key saved"));
    }

    pub fn update_realtime_config(&self, update: RealtimeConfigUpdate) {
        self.store.dispatch(AppAction::SetRealtimeConfig(update));
    }

    /// Add a training snippet; surrounding whitespace is dropped
    pub fn add_training(&self, content: &str) -> Result<TrainingData> {
        let content = content.trim();
        if content.is_empty() {
            self.notifier.notify(Notice::error("Please enter some training data."));
            return Err(WhispererError::InvalidInputError(
                "training content is empty".to_string(),
            ));
        }

        let data = TrainingData::new(content);
        self.store.dispatch(AppAction::AddTrainingData(data.clone()));
        self.notifier.notify(Notice::success("Training data added"));
        Ok(data)
    }

    pub fn remove_training(&self, id: Uuid) {
        self.store.dispatch(AppAction::RemoveTrainingData(id));
        self.notifier.notify(Notice::info("Training data removed"));
    }

    pub async fn simulate_incoming_call(&self) -> CallOutcome {
        self.simulator.simulate_incoming_call().await
    }
}
