//! Reply generation stand-in
//!
//! Produces a templated answer instead of calling a language model.

use crate::notify::{Notice, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Reply used when no API key is configured
pub const MISSING_KEY_REPLY: &str =
    "Sorry, I can't respond right now. The system is not properly configured.";

/// Template reply for a transcript
pub fn compose_reply(transcript: &str) -> String {
    let topic = if transcript.contains("appointment") {
        "scheduling an appointment"
    } else {
        "getting some information"
    };
    format!(
        "Hi there! This is an automated response. I understand you're calling about {}. How can I assist you today?",
        topic
    )
}

#[derive(Clone)]
pub struct ResponseGenerator {
    delay: Duration,
    notifier: Arc<dyn Notifier>,
}

impl ResponseGenerator {
    pub fn new(delay: Duration, notifier: Arc<dyn Notifier>) -> Self {
        Self { delay, notifier }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reply to `transcript` using the training text and caller description
    ///
    /// Without an API key this returns [`MISSING_KEY_REPLY`] immediately.
    pub async fn generate_response(
        &self,
        api_key: Option<&str>,
        training_data: &str,
        caller_info: &str,
        transcript: &str,
    ) -> String {
        if api_key.is_none() {
            warn!("Generating response without an API key");
            self.notifier.notify(Notice::error(
                "API key is missing. Please add your OpenAI API key in settings.",
            ));
            return MISSING_KEY_REPLY.to_string();
        }

        info!(caller = %caller_info, "Generating response...");
        debug!(training = %training_data, transcript = %transcript, "response inputs");
        sleep(self.delay).await;
        compose_reply(transcript)
    }
}
