//! Speech-to-text stand-in

use crate::{Result, WhispererError};
use rand::seq::SliceRandom;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Sentences the mock transcriber picks from
pub const MOCK_TRANSCRIPTS: [&str; 5] = [
    "Hi, I'd like to schedule an appointment for next week.",
    "Hello, I'm calling about the invoice I received yesterday.",
    "I have a question about your services.",
    "Is this the right number for customer support?",
    "I need some information about your business hours.",
];

/// Returns a random canned sentence after a fixed delay
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    transcripts: Vec<String>,
    delay: Duration,
}

impl MockTranscriber {
    pub fn new(delay: Duration) -> Self {
        Self::with_transcripts(MOCK_TRANSCRIPTS.iter().map(|s| s.to_string()).collect(), delay)
    }

    pub fn with_transcripts(transcripts: Vec<String>, delay: Duration) -> Self {
        Self { transcripts, delay }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// "Transcribe" captured audio; the samples are ignored
    pub async fn transcribe(&self, audio: &[f32]) -> Result<String> {
        info!(samples = audio.len(), "Transcribing audio...");
        sleep(self.delay).await;

        let text = self
            .transcripts
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| WhispererError::SimulationError("no transcripts configured".to_string()))?;
        debug!(transcript = %text, "transcription ready");
        Ok(text)
    }
}
