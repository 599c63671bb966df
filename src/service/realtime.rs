//! Realtime voice session stand-in
//!
//! A real session would stream microphone audio to a bidirectional voice API
//! and receive transcripts and spoken replies. Here the session owns a mock
//! audio capture and a mock connection, and a background task pushes one
//! transcript and one reply on fixed timers.
//!
//! All handles are fields of [`RealtimeSession`]. [`RealtimeSession::stop`]
//! tears them down and is also run on drop, so error paths cannot leak a
//! running capture or connection.

use super::respond::compose_reply;
use crate::state::RealtimeConfig;
use crate::{Result, WhispererError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What the caller "says" during a realtime session
pub const REALTIME_TRANSCRIPT: &str = "Hi, I'd like to schedule an appointment for next week.";

/// Events pushed by a running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// Caller speech recognized
    Transcript(String),
    /// The assistant replied
    AiResponse(String),
}

/// Delays, measured from `start`, at which session events fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeTimings {
    pub transcript_delay_ms: u64,
    pub response_delay_ms: u64,
}

impl Default for RealtimeTimings {
    fn default() -> Self {
        Self {
            transcript_delay_ms: 2000,
            response_delay_ms: 4000,
        }
    }
}

impl RealtimeTimings {
    pub fn instant() -> Self {
        Self {
            transcript_delay_ms: 0,
            response_delay_ms: 0,
        }
    }
}

/// Microphone permission stand-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicrophoneAccess {
    granted: bool,
}

impl MicrophoneAccess {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }

    pub fn new(granted: bool) -> Self {
        Self { granted }
    }

    /// Prompt for the microphone and open a capture on success
    pub fn request(&self) -> Result<AudioCapture> {
        if !self.granted {
            return Err(WhispererError::MicrophoneError(
                "microphone access denied".to_string(),
            ));
        }
        Ok(AudioCapture::open())
    }
}

/// An open microphone capture
#[derive(Debug)]
pub struct AudioCapture {
    id: Uuid,
    opened_at: Instant,
    sample_rate: u32,
}

impl AudioCapture {
    fn open() -> Self {
        let capture = Self {
            id: Uuid::new_v4(),
            opened_at: Instant::now(),
            sample_rate: 24000,
        };
        debug!(capture = %capture.id, sample_rate = capture.sample_rate, "audio capture opened");
        capture
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        debug!(
            capture = %self.id,
            open_ms = self.opened_at.elapsed().as_millis() as u64,
            "audio capture closed"
        );
    }
}

/// A connection to the voice API
#[derive(Debug)]
pub struct RealtimeConnection {
    id: Uuid,
    model: String,
    voice: String,
    instructions: String,
}

impl RealtimeConnection {
    fn open(config: &RealtimeConfig, instructions: String) -> Self {
        let connection = Self {
            id: Uuid::new_v4(),
            model: config.model.to_string(),
            voice: config.voice.to_string(),
            instructions,
        };
        info!(
            connection = %connection.id,
            model = %connection.model,
            voice = %connection.voice,
            "realtime connection opened"
        );
        connection
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

impl Drop for RealtimeConnection {
    fn drop(&mut self) {
        debug!(connection = %self.id, "realtime connection closed");
    }
}

/// Build the system prompt handed to the voice API
pub fn session_instructions(training_data: &str, caller_info: &str) -> String {
    let mut instructions = format!(
        "You are answering a phone call on behalf of the user. The caller is {}.",
        caller_info
    );
    if !training_data.is_empty() {
        instructions.push_str("\nFollow these instructions:\n");
        instructions.push_str(training_data);
    }
    instructions
}

/// Check that a session could be opened with `config`
pub fn setup_realtime_connection(config: &RealtimeConfig) -> Result<()> {
    if config.api_key.is_none() {
        return Err(WhispererError::MissingApiKeyError(
            "realtime session needs an API key".to_string(),
        ));
    }
    info!(model = %config.model, voice = %config.voice, "Realtime connection configured");
    Ok(())
}

/// One realtime voice session
pub struct RealtimeSession {
    config: RealtimeConfig,
    microphone: MicrophoneAccess,
    timings: RealtimeTimings,
    capture: Option<AudioCapture>,
    connection: Option<RealtimeConnection>,
    task: Option<JoinHandle<()>>,
}

impl RealtimeSession {
    /// Validate the configuration; nothing is opened yet
    pub fn setup(
        config: RealtimeConfig,
        microphone: MicrophoneAccess,
        timings: RealtimeTimings,
    ) -> Result<Self> {
        setup_realtime_connection(&config)?;
        Ok(Self {
            config,
            microphone,
            timings,
            capture: None,
            connection: None,
            task: None,
        })
    }

    /// Open the capture and connection and begin pushing events
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        training_data: &str,
        caller_info: &str,
    ) -> Result<UnboundedReceiver<RealtimeEvent>> {
        if self.is_active() {
            return Err(WhispererError::RealtimeError("session already started".to_string()));
        }

        let capture = self.microphone.request()?;
        let connection =
            RealtimeConnection::open(&self.config, session_instructions(training_data, caller_info));
        debug!(instructions = %connection.instructions(), "session instructions");

        let (tx, rx) = unbounded_channel();
        self.task = Some(tokio::spawn(push_scripted_events(tx, self.timings)));
        self.capture = Some(capture);
        self.connection = Some(connection);
        info!("Realtime call started");
        Ok(rx)
    }

    /// Tear down the capture, connection and event task
    pub fn stop(&mut self) {
        let was_active = self.is_active();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.capture = None;
        self.connection = None;
        if was_active {
            info!("Realtime call stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some() || self.capture.is_some() || self.connection.is_some()
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}

impl Drop for RealtimeSession {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn push_scripted_events(tx: UnboundedSender<RealtimeEvent>, timings: RealtimeTimings) {
    let transcript_at = Duration::from_millis(timings.transcript_delay_ms);
    let response_at = Duration::from_millis(timings.response_delay_ms.max(timings.transcript_delay_ms));

    sleep(transcript_at).await;
    if tx.send(RealtimeEvent::Transcript(REALTIME_TRANSCRIPT.to_string())).is_err() {
        warn!("Realtime listener gone before transcript");
        return;
    }

    sleep(response_at - transcript_at).await;
    if tx.send(RealtimeEvent::AiResponse(compose_reply(REALTIME_TRANSCRIPT))).is_err() {
        warn!("Realtime listener gone before reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RealtimeVoice;

    fn config_with_key() -> RealtimeConfig {
        RealtimeConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_setup_requires_key() {
        let err = RealtimeSession::setup(
            RealtimeConfig::default(),
            MicrophoneAccess::granted(),
            RealtimeTimings::instant(),
        )
        .err()
        .expect("setup should fail");
        assert!(matches!(err, WhispererError::MissingApiKeyError(_)));

        let config = RealtimeConfig {
            api_key: Some("sk-test".to_string()),
            voice: RealtimeVoice::Echo,
            ..Default::default()
        };
        let session =
            RealtimeSession::setup(config, MicrophoneAccess::granted(), RealtimeTimings::instant())
                .unwrap();
        assert!(!session.is_active());
        assert_eq!(session.config().voice, RealtimeVoice::Echo);
    }

    #[test]
    fn test_instructions_include_training() {
        let text = session_instructions("Be polite.", "John Smith (+1 555-123-4567)");
        assert!(text.contains("John Smith (+1 555-123-4567)"));
        assert!(text.ends_with("Be polite."));

        let bare = session_instructions("", "+1 555-741-9630");
        assert!(!bare.contains("Follow these instructions"));
    }

    #[tokio::test]
    async fn test_microphone_denied() {
        let mut session = RealtimeSession::setup(
            config_with_key(),
            MicrophoneAccess::denied(),
            RealtimeTimings::instant(),
        )
        .unwrap();
        let err = session.start("", "+1 555").unwrap_err();
        assert!(matches!(err, WhispererError::MicrophoneError(_)));
        assert!(!session.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_arrive_on_schedule() {
        let mut session = RealtimeSession::setup(
            config_with_key(),
            MicrophoneAccess::granted(),
            RealtimeTimings::default(),
        )
        .unwrap();
        let start = tokio::time::Instant::now();
        let mut rx = session.start("", "+1 555-741-9630").unwrap();
        assert!(session.is_active());

        let first = rx.recv().await.unwrap();
        assert_eq!(first, RealtimeEvent::Transcript(REALTIME_TRANSCRIPT.to_string()));
        assert!(start.elapsed() >= Duration::from_millis(2000));

        let second = rx.recv().await.unwrap();
        match second {
            RealtimeEvent::AiResponse(text) => assert!(text.contains("scheduling an appointment")),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(start.elapsed() >= Duration::from_millis(4000));

        session.stop();
        assert!(!session.is_active());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_events() {
        let mut session = RealtimeSession::setup(
            config_with_key(),
            MicrophoneAccess::granted(),
            RealtimeTimings::default(),
        )
        .unwrap();
        let mut rx = session.start("", "+1 555").unwrap();
        session.stop();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let mut session = RealtimeSession::setup(
            config_with_key(),
            MicrophoneAccess::granted(),
            RealtimeTimings::instant(),
        )
        .unwrap();
        let _rx = session.start("", "+1 555").unwrap();
        assert!(session.start("", "+1 555").is_err());
    }

    #[tokio::test]
    async fn test_drop_tears_down() {
        let mut rx = {
            let mut session = RealtimeSession::setup(
                config_with_key(),
                MicrophoneAccess::granted(),
                RealtimeTimings {
                    transcript_delay_ms: 60_000,
                    response_delay_ms: 60_000,
                },
            )
            .unwrap();
            session.start("", "+1 555").unwrap()
        };
        assert!(rx.recv().await.is_none());
    }
}
