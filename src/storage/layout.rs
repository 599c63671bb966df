use crate::state::types::{AppState, CallRecord, RealtimeConfig, TrainingData, MAX_CALL_HISTORY};
use crate::state::{reduce, AppAction};
use crate::Result;
use serde::{Deserialize, Serialize};

/// On-disk layout of the saved state
///
/// Timestamps are written as RFC 3339 strings and parsed back into
/// `DateTime<Utc>` on load. The auto-answer flag and the call in flight are
/// not part of the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub realtime_config: Option<RealtimeConfig>,
    #[serde(default)]
    pub training_data: Vec<TrainingData>,
    #[serde(default)]
    pub call_history: Vec<CallRecord>,
}

impl PersistedState {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            api_key: state.api_key.clone(),
            realtime_config: Some(state.realtime_config.clone()),
            training_data: state.training_data.clone(),
            call_history: state.call_history.clone(),
        }
    }

    /// Restore the saved fields on top of `state`
    pub fn apply_to(self, state: AppState) -> AppState {
        let mut state = reduce(state, AppAction::SetApiKey(self.api_key));
        if let Some(config) = self.realtime_config {
            state = reduce(state, AppAction::SetRealtimeConfig(config.into()));
        }
        state.training_data = self.training_data;
        state.call_history = self.call_history;
        state.call_history.truncate(MAX_CALL_HISTORY);
        state
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
