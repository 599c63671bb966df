//! Mocked external services
//!
//! This module provides:
//! - A call permission probe
//! - Speech-to-text returning canned sentences
//! - Reply generation from a template
//! - A realtime voice session pushing scripted events

pub mod permission;
pub mod realtime;
pub mod respond;
pub mod transcribe;

pub use permission::{PermissionOutcome, PermissionProbe};
pub use realtime::{
    setup_realtime_connection, MicrophoneAccess, RealtimeEvent, RealtimeSession, RealtimeTimings,
};
pub use respond::{compose_reply, ResponseGenerator, MISSING_KEY_REPLY};
pub use transcribe::{MockTranscriber, MOCK_TRANSCRIPTS};
