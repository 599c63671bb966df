use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of call records kept in history
pub const MAX_CALL_HISTORY: usize = 50;

/// A free-text snippet that biases the response generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingData {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TrainingData {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Someone placing a call; the name is unknown for unlisted numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub name: Option<String>,
    pub number: String,
}

impl Caller {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            number: number.into(),
        }
    }

    pub fn unknown(number: impl Into<String>) -> Self {
        Self {
            name: None,
            number: number.into(),
        }
    }

    /// Short label for notices: the name if known, otherwise the number
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.number)
    }

    /// Description handed to the response generator, e.g. `John Smith (+1 555-123-4567)`
    pub fn description(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.number),
            None => self.number.clone(),
        }
    }
}

/// Summary of one simulated call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: Uuid,
    pub caller_name: Option<String>,
    pub phone_number: String,
    pub timestamp: DateTime<Utc>,
    /// Call length in seconds
    pub duration: u32,
    pub transcript: String,
    pub ai_responses: Vec<String>,
}

impl CallRecord {
    /// Start a fresh record for an incoming call
    pub fn new(caller: &Caller) -> Self {
        Self {
            id: Uuid::new_v4(),
            caller_name: caller.name.clone(),
            phone_number: caller.number.clone(),
            timestamp: Utc::now(),
            duration: 0,
            transcript: String::new(),
            ai_responses: Vec::new(),
        }
    }

    pub fn caller(&self) -> Caller {
        Caller {
            name: self.caller_name.clone(),
            number: self.phone_number.clone(),
        }
    }

    pub fn caller_label(&self) -> &str {
        self.caller_name.as_deref().unwrap_or(&self.phone_number)
    }

    /// Duration rendered as `m:ss`
    pub fn formatted_duration(&self) -> String {
        format!("{}:{:02}", self.duration / 60, self.duration % 60)
    }

    /// Still waiting on the caller to say something
    pub fn is_listening(&self) -> bool {
        self.transcript.is_empty()
    }
}

/// Models accepted by the realtime voice API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealtimeModel {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
}

impl RealtimeModel {
    pub const ALL: [RealtimeModel; 2] = [RealtimeModel::Gpt4o, RealtimeModel::Gpt4oMini];

    pub fn as_str(&self) -> &'static str {
        match self {
            RealtimeModel::Gpt4o => "gpt-4o",
            RealtimeModel::Gpt4oMini => "gpt-4o-mini",
        }
    }
}

impl std::fmt::Display for RealtimeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthetic voices the realtime API can speak with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeVoice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl RealtimeVoice {
    pub const ALL: [RealtimeVoice; 6] = [
        RealtimeVoice::Alloy,
        RealtimeVoice::Echo,
        RealtimeVoice::Fable,
        RealtimeVoice::Onyx,
        RealtimeVoice::Nova,
        RealtimeVoice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RealtimeVoice::Alloy => "alloy",
            RealtimeVoice::Echo => "echo",
            RealtimeVoice::Fable => "fable",
            RealtimeVoice::Onyx => "onyx",
            RealtimeVoice::Nova => "nova",
            RealtimeVoice::Shimmer => "shimmer",
        }
    }
}

impl std::fmt::Display for RealtimeVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings for the realtime voice session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeConfig {
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: RealtimeModel,
    #[serde(default)]
    pub voice: RealtimeVoice,
}

/// Partial update merged into a [`RealtimeConfig`]; `None` fields keep their value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealtimeConfigUpdate {
    pub api_key: Option<String>,
    pub model: Option<RealtimeModel>,
    pub voice: Option<RealtimeVoice>,
}

impl RealtimeConfigUpdate {
    pub fn model(model: RealtimeModel) -> Self {
        Self {
            model: Some(model),
            ..Default::default()
        }
    }

    pub fn voice(voice: RealtimeVoice) -> Self {
        Self {
            voice: Some(voice),
            ..Default::default()
        }
    }
}

impl From<RealtimeConfig> for RealtimeConfigUpdate {
    fn from(config: RealtimeConfig) -> Self {
        Self {
            api_key: config.api_key,
            model: Some(config.model),
            voice: Some(config.voice),
        }
    }
}

/// The whole application state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Auto-answer switch
    pub is_enabled: bool,
    pub api_key: Option<String>,
    pub realtime_config: RealtimeConfig,
    /// Insertion order
    pub training_data: Vec<TrainingData>,
    /// Newest first, at most [`MAX_CALL_HISTORY`] entries
    pub call_history: Vec<CallRecord>,
    pub current_call: Option<CallRecord>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// All training snippets joined with newlines
    pub fn training_content(&self) -> String {
        self.training_data
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Realtime settings with the top-level API key filled in
    pub fn effective_realtime_config(&self) -> RealtimeConfig {
        RealtimeConfig {
            api_key: self.api_key.clone().or_else(|| self.realtime_config.api_key.clone()),
            model: self.realtime_config.model,
            voice: self.realtime_config.voice,
        }
    }

    /// True when the persisted part of the state differs from `other`
    pub fn persisted_fields_differ(&self, other: &AppState) -> bool {
        self.api_key != other.api_key
            || self.realtime_config != other.realtime_config
            || self.training_data != other.training_data
            || self.call_history != other.call_history
    }
}
