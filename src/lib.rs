//! Call Whisperer - a simulated AI assistant that answers phone calls
//!
//! The crate models a small application: an auto-answer switch, an API key,
//! free-text training snippets, a capped call history and the call currently
//! in flight. Incoming calls are simulated end to end (ring, answer,
//! transcribe, reply, hang up) against mocked speech and AI services.

pub mod integration;
pub mod notify;
pub mod service;
pub mod simulator;
pub mod state;
pub mod storage;

use thiserror::Error;

pub use integration::{CallWhisperer, WhispererConfig};
pub use notify::{ChannelNotifier, LogNotifier, Notice, NoticeLevel, Notifier};
pub use simulator::{CallOutcome, CallSimulator, CallStage, SimulationMode, SimulatorTimings};
pub use state::{AppAction, AppState, CallRecord, Caller, RealtimeConfig, Store, TrainingData};
pub use storage::{FileStorage, MemoryStorage, PersistedState, StateStorage};

#[derive(Error, Debug, Clone)]
pub enum WhispererError {
    #[error("Permission denied: {0}")]
    PermissionDeniedError(String),

    #[error("Missing API key: {0}")]
    MissingApiKeyError(String),

    #[error("Call already in progress: {0}")]
    CallInProgressError(String),

    #[error("Realtime session error: {0}")]
    RealtimeError(String),

    #[error("Microphone error: {0}")]
    MicrophoneError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Simulation error: {0}")]
    SimulationError(String),

    #[error("Invalid input: {0}")]
    InvalidInputError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for WhispererError {
    fn from(e: std::io::Error) -> Self {
        WhispererError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for WhispererError {
    fn from(e: serde_json::Error) -> Self {
        WhispererError::SerializationError(e.to_string())
    }
}

impl WhispererError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user has to grant access in system settings
            WhispererError::PermissionDeniedError(_) => false,
            WhispererError::MissingApiKeyError(_) => false,
            // Retrying once the current call ends works
            WhispererError::CallInProgressError(_) => true,
            WhispererError::RealtimeError(_) => true,
            WhispererError::MicrophoneError(_) => false,
            WhispererError::StorageError(_) => true,
            WhispererError::SerializationError(_) => false,
            WhispererError::ConfigError(_) => false,
            WhispererError::ChannelError(_) => false,
            WhispererError::SimulationError(_) => true,
            WhispererError::InvalidInputError(_) => true,
            WhispererError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            WhispererError::PermissionDeniedError(_) => {
                "Call permission denied. Please grant permissions in settings.".to_string()
            }
            WhispererError::MissingApiKeyError(_) => {
                "API key is missing. Please add your OpenAI API key in settings.".to_string()
            }
            WhispererError::CallInProgressError(_) => {
                "A call is already being handled. Please wait for it to finish.".to_string()
            }
            WhispererError::RealtimeError(_) => {
                "Failed to establish realtime connection".to_string()
            }
            WhispererError::MicrophoneError(_) => {
                "Microphone access failed. Please check your microphone permissions.".to_string()
            }
            WhispererError::StorageError(_) => {
                "Your previous settings could not be loaded.".to_string()
            }
            WhispererError::SerializationError(_) => {
                "Saved data is corrupted and could not be read.".to_string()
            }
            WhispererError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            WhispererError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            WhispererError::SimulationError(_) => "Simulated call failed".to_string(),
            WhispererError::InvalidInputError(_) => "Please enter some training data.".to_string(),
            WhispererError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WhispererError>;
