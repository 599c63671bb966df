//! Pure state transitions
//!
//! Every change to [`AppState`] goes through [`reduce`]. It never performs
//! I/O; persistence and change notification are handled by the store.

use super::types::{
    AppState, CallRecord, RealtimeConfigUpdate, TrainingData, MAX_CALL_HISTORY,
};
use uuid::Uuid;

/// Actions that can be applied to the application state
#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    /// Turn auto-answer on or off
    SetEnabled(bool),
    /// Replace the API key; blank keys are stored as absent
    SetApiKey(Option<String>),
    /// Merge a partial realtime configuration
    SetRealtimeConfig(RealtimeConfigUpdate),
    /// Append a training snippet
    AddTrainingData(TrainingData),
    /// Remove a training snippet by id
    RemoveTrainingData(Uuid),
    /// Prepend a finished call to history
    AddCallRecord(CallRecord),
    /// Replace or clear the call in flight
    SetCurrentCall(Option<CallRecord>),
}

impl AppAction {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            AppAction::SetEnabled(_) => "set_enabled",
            AppAction::SetApiKey(_) => "set_api_key",
            AppAction::SetRealtimeConfig(_) => "set_realtime_config",
            AppAction::AddTrainingData(_) => "add_training_data",
            AppAction::RemoveTrainingData(_) => "remove_training_data",
            AppAction::AddCallRecord(_) => "add_call_record",
            AppAction::SetCurrentCall(_) => "set_current_call",
        }
    }
}

fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

/// Apply `action` to `state`, returning the next state
pub fn reduce(state: AppState, action: AppAction) -> AppState {
    match action {
        AppAction::SetEnabled(is_enabled) => AppState { is_enabled, ..state },
        AppAction::SetApiKey(key) => AppState {
            api_key: normalize_key(key),
            ..state
        },
        AppAction::SetRealtimeConfig(update) => {
            let mut realtime_config = state.realtime_config.clone();
            if let Some(model) = update.model {
                realtime_config.model = model;
            }
            if let Some(voice) = update.voice {
                realtime_config.voice = voice;
            }
            // A supplied key wins, then the top-level key, then whatever was there.
            realtime_config.api_key = normalize_key(update.api_key)
                .or_else(|| state.api_key.clone())
                .or(realtime_config.api_key);
            AppState {
                realtime_config,
                ..state
            }
        }
        AppAction::AddTrainingData(data) => {
            let mut training_data = state.training_data;
            training_data.push(data);
            AppState {
                training_data,
                ..state
            }
        }
        AppAction::RemoveTrainingData(id) => {
            let mut training_data = state.training_data;
            training_data.retain(|data| data.id != id);
            AppState {
                training_data,
                ..state
            }
        }
        AppAction::AddCallRecord(record) => {
            let mut call_history = Vec::with_capacity(MAX_CALL_HISTORY);
            call_history.push(record);
            call_history.extend(state.call_history);
            call_history.truncate(MAX_CALL_HISTORY);
            AppState {
                call_history,
                ..state
            }
        }
        AppAction::SetCurrentCall(current_call) => AppState {
            current_call,
            ..state
        },
    }
}
