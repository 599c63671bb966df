//! Application state: data types, the reducer and the shared store

pub mod reducer;
pub mod store;
pub mod types;

pub use reducer::{reduce, AppAction};
pub use store::{Store, StoreEvent};
pub use types::{
    AppState, CallRecord, Caller, RealtimeConfig, RealtimeConfigUpdate, RealtimeModel,
    RealtimeVoice, TrainingData, MAX_CALL_HISTORY,
};
