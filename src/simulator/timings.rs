use crate::service::RealtimeTimings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which variant of the call workflow runs after answering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// A realtime voice session pushes the transcript and reply
    #[default]
    Realtime,
    /// Transcribe, then generate a reply, one after the other
    Direct,
}

/// Mock delays, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorTimings {
    /// Ringing before the auto-answer decision
    pub ring_ms: u64,
    /// Direct variant: wait after answering before transcribing
    pub pre_transcribe_ms: u64,
    /// Direct variant: wait after replying before hanging up
    pub hang_up_ms: u64,
    /// Realtime variant: how long the session is held open
    pub realtime_hold_ms: u64,
    pub transcribe_ms: u64,
    pub respond_ms: u64,
    pub permission_ms: u64,
    pub realtime_transcript_ms: u64,
    pub realtime_response_ms: u64,
}

impl Default for SimulatorTimings {
    fn default() -> Self {
        Self {
            ring_ms: 2000,
            pre_transcribe_ms: 2000,
            hang_up_ms: 3000,
            realtime_hold_ms: 10000,
            transcribe_ms: 1000,
            respond_ms: 1500,
            permission_ms: 1000,
            realtime_transcript_ms: 2000,
            realtime_response_ms: 4000,
        }
    }
}

impl SimulatorTimings {
    /// No delays at all
    pub fn instant() -> Self {
        Self {
            ring_ms: 0,
            pre_transcribe_ms: 0,
            hang_up_ms: 0,
            realtime_hold_ms: 0,
            transcribe_ms: 0,
            respond_ms: 0,
            permission_ms: 0,
            realtime_transcript_ms: 0,
            realtime_response_ms: 0,
        }
    }

    pub fn ring(&self) -> Duration {
        Duration::from_millis(self.ring_ms)
    }

    pub fn pre_transcribe(&self) -> Duration {
        Duration::from_millis(self.pre_transcribe_ms)
    }

    pub fn hang_up(&self) -> Duration {
        Duration::from_millis(self.hang_up_ms)
    }

    pub fn realtime_hold(&self) -> Duration {
        Duration::from_millis(self.realtime_hold_ms)
    }

    pub fn transcribe(&self) -> Duration {
        Duration::from_millis(self.transcribe_ms)
    }

    pub fn respond(&self) -> Duration {
        Duration::from_millis(self.respond_ms)
    }

    pub fn permission(&self) -> Duration {
        Duration::from_millis(self.permission_ms)
    }

    pub fn realtime(&self) -> RealtimeTimings {
        RealtimeTimings {
            transcript_delay_ms: self.realtime_transcript_ms,
            response_delay_ms: self.realtime_response_ms,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.realtime_response_ms < self.realtime_transcript_ms {
            return Err(format!(
                "realtime reply ({}ms) scheduled before transcript ({}ms)",
                self.realtime_response_ms, self.realtime_transcript_ms
            ));
        }
        if self.realtime_hold_ms < self.realtime_response_ms {
            return Err(format!(
                "realtime hold ({}ms) ends before the reply ({}ms)",
                self.realtime_hold_ms, self.realtime_response_ms
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings_valid() {
        let timings = SimulatorTimings::default();
        assert!(timings.validate().is_ok());
        assert_eq!(timings.ring(), Duration::from_secs(2));
        assert_eq!(timings.realtime().response_delay_ms, 4000);
        assert!(SimulatorTimings::instant().validate().is_ok());
    }

    #[test]
    fn test_hold_shorter_than_reply_invalid() {
        let timings = SimulatorTimings {
            realtime_hold_ms: 1000,
            ..Default::default()
        };
        assert!(timings.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let timings: SimulatorTimings = toml::from_str("ring_ms = 10").unwrap();
        assert_eq!(timings.ring_ms, 10);
        assert_eq!(timings.hang_up_ms, 3000);
    }
}
