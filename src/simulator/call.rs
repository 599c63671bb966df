//! Simulated incoming call workflow
//!
//! A call moves through fixed stages:
//! Armed -> Ringing -> Answered -> Transcribing -> Responding -> Ending -> Completed
//!
//! The only cancellation point is the end of ringing: if auto-answer was
//! switched off in the meantime the call is dropped without a history entry.
//! Errors anywhere after that are caught at the top, reported with a notice,
//! and leave the call history untouched.

use super::roster::CallerRoster;
use super::timings::{SimulationMode, SimulatorTimings};
use crate::notify::{Notice, Notifier};
use crate::service::{
    MicrophoneAccess, MockTranscriber, RealtimeEvent, RealtimeSession, ResponseGenerator,
};
use crate::state::{AppAction, CallRecord, Caller, Store};
use crate::{Result, WhispererError};
use parking_lot::RwLock;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// Where the call in flight currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallStage {
    Armed,
    Ringing,
    Answered,
    Transcribing,
    Responding,
    Ending,
    Completed,
}

impl std::fmt::Display for CallStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStage::Armed => write!(f, "Armed"),
            CallStage::Ringing => write!(f, "Ringing"),
            CallStage::Answered => write!(f, "Answered"),
            CallStage::Transcribing => write!(f, "Transcribing"),
            CallStage::Responding => write!(f, "Responding"),
            CallStage::Ending => write!(f, "Ending"),
            CallStage::Completed => write!(f, "Completed"),
        }
    }
}

/// How a simulated call ended
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// Finished and recorded at the front of the history
    Completed(CallRecord),
    /// Auto-answer was off when ringing ended
    Missed,
    /// Never started (no API key, or another call in flight)
    Rejected(WhispererError),
    /// The realtime session could not be opened
    ConnectionFailed(WhispererError),
    /// Something failed mid-call
    Failed(WhispererError),
}

impl CallOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CallOutcome::Completed(_))
    }

    pub fn record(&self) -> Option<&CallRecord> {
        match self {
            CallOutcome::Completed(record) => Some(record),
            _ => None,
        }
    }
}

/// Resets the per-call flags however the call exits
struct ActiveCallGuard {
    in_progress: Arc<AtomicBool>,
    realtime_active: Arc<AtomicBool>,
    stage: Arc<RwLock<Option<CallStage>>>,
}

impl Drop for ActiveCallGuard {
    fn drop(&mut self) {
        self.in_progress.store(false, Ordering::SeqCst);
        self.realtime_active.store(false, Ordering::SeqCst);
        *self.stage.write() = None;
    }
}

/// Drives simulated calls against the store
#[derive(Clone)]
pub struct CallSimulator {
    store: Store,
    notifier: Arc<dyn Notifier>,
    transcriber: MockTranscriber,
    generator: ResponseGenerator,
    roster: CallerRoster,
    microphone: MicrophoneAccess,
    mode: SimulationMode,
    timings: SimulatorTimings,
    in_progress: Arc<AtomicBool>,
    realtime_active: Arc<AtomicBool>,
    stage: Arc<RwLock<Option<CallStage>>>,
}

impl CallSimulator {
    pub fn new(store: Store, notifier: Arc<dyn Notifier>) -> Self {
        let timings = SimulatorTimings::default();
        Self {
            store,
            transcriber: MockTranscriber::new(timings.transcribe()),
            generator: ResponseGenerator::new(timings.respond(), Arc::clone(&notifier)),
            notifier,
            roster: CallerRoster::default(),
            microphone: MicrophoneAccess::granted(),
            mode: SimulationMode::default(),
            timings,
            in_progress: Arc::new(AtomicBool::new(false)),
            realtime_active: Arc::new(AtomicBool::new(false)),
            stage: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timings(mut self, timings: SimulatorTimings) -> Self {
        self.transcriber = self.transcriber.with_delay(timings.transcribe());
        self.generator = self.generator.with_delay(timings.respond());
        self.timings = timings;
        self
    }

    pub fn with_roster(mut self, roster: CallerRoster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_microphone(mut self, microphone: MicrophoneAccess) -> Self {
        self.microphone = microphone;
        self
    }

    /// Replace the transcriber; its delay is taken from the current timings
    pub fn with_transcriber(mut self, transcriber: MockTranscriber) -> Self {
        self.transcriber = transcriber.with_delay(self.timings.transcribe());
        self
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    /// A call is being handled
    pub fn is_busy(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub fn is_realtime_active(&self) -> bool {
        self.realtime_active.load(Ordering::SeqCst)
    }

    pub fn stage(&self) -> Option<CallStage> {
        *self.stage.read()
    }

    fn set_stage(&self, stage: CallStage, call: &CallRecord) {
        *self.stage.write() = Some(stage);
        debug!(call_id = %call.id, %stage, "call stage");
    }

    fn publish(&self, call: &CallRecord) {
        self.store.dispatch(AppAction::SetCurrentCall(Some(call.clone())));
    }

    fn clear_current_call(&self) {
        self.store.dispatch(AppAction::SetCurrentCall(None));
    }

    /// Ring in a random caller and handle the call to completion
    ///
    /// Never returns an error: every failure is reported through the
    /// notifier and reflected in the returned outcome.
    pub async fn simulate_incoming_call(&self) -> CallOutcome {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Simulated call requested while another is in flight");
            return CallOutcome::Rejected(WhispererError::CallInProgressError(
                "a simulated call is already running".to_string(),
            ));
        }
        let _guard = ActiveCallGuard {
            in_progress: Arc::clone(&self.in_progress),
            realtime_active: Arc::clone(&self.realtime_active),
            stage: Arc::clone(&self.stage),
        };

        let snapshot = self.store.snapshot();
        if snapshot.current_call.is_some() {
            warn!("Current call slot already occupied");
            return CallOutcome::Rejected(WhispererError::CallInProgressError(
                "another call is active".to_string(),
            ));
        }
        if !snapshot.has_api_key() {
            self.notifier.notify(Notice::error(
                "Please add your OpenAI API key in settings before testing.",
            ));
            return CallOutcome::Rejected(WhispererError::MissingApiKeyError(
                "no API key configured".to_string(),
            ));
        }
        if snapshot.training_data.is_empty() {
            self.notifier.notify(Notice::warning(
                "No training data available. Responses may be generic.",
            ));
        }

        let caller = self.roster.pick();
        self.notifier
            .notify(Notice::info(format!("Incoming call from {}", caller.label())));

        match self.run_call(&caller).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, caller = %caller.label(), "Error in simulated call");
                self.notifier.notify(Notice::error("Simulated call failed"));
                self.clear_current_call();
                CallOutcome::Failed(e)
            }
        }
    }

    async fn run_call(&self, caller: &Caller) -> Result<CallOutcome> {
        let mut call = CallRecord::new(caller);
        info!(call_id = %call.id, caller = %caller.label(), "Incoming call");
        self.set_stage(CallStage::Armed, &call);
        self.publish(&call);

        self.set_stage(CallStage::Ringing, &call);
        sleep(self.timings.ring()).await;

        if !self.store.is_enabled() {
            info!(call_id = %call.id, "Auto-answer disabled, call not answered");
            self.notifier
                .notify(Notice::info("Call not answered - Call Whisperer is disabled"));
            self.clear_current_call();
            return Ok(CallOutcome::Missed);
        }

        self.set_stage(CallStage::Answered, &call);
        self.notifier.notify(Notice::success("Call automatically answered"));

        let state = self.store.snapshot();
        let training = state.training_content();
        let caller_info = caller.description();

        match self.mode {
            SimulationMode::Realtime => {
                let config = state.effective_realtime_config();
                let opened = RealtimeSession::setup(config, self.microphone, self.timings.realtime())
                    .and_then(|mut session| {
                        let events = session.start(&training, &caller_info)?;
                        Ok((session, events))
                    });
                let (mut session, events) = match opened {
                    Ok(opened) => opened,
                    Err(e) => {
                        warn!(call_id = %call.id, error = %e, "Realtime session failed to start");
                        self.notifier
                            .notify(Notice::error("Failed to establish realtime connection"));
                        self.clear_current_call();
                        return Ok(CallOutcome::ConnectionFailed(e));
                    }
                };

                info!(
                    call_id = %call.id,
                    model = %session.config().model,
                    voice = %session.config().voice,
                    "Realtime session answering"
                );
                self.realtime_active.store(true, Ordering::SeqCst);
                self.hold_realtime(&mut call, events).await;

                self.set_stage(CallStage::Ending, &call);
                session.stop();
                self.realtime_active.store(false, Ordering::SeqCst);
            }
            SimulationMode::Direct => {
                self.converse_direct(&mut call, state.api_key.as_deref(), &training, &caller_info)
                    .await?;
                self.set_stage(CallStage::Ending, &call);
                sleep(self.timings.hang_up()).await;
            }
        }

        call.duration = rand::thread_rng().gen_range(20..80);

        self.set_stage(CallStage::Completed, &call);
        info!(
            call_id = %call.id,
            duration = call.duration,
            responses = call.ai_responses.len(),
            "Call ended"
        );
        self.notifier.notify(Notice::info("Call ended"));
        self.store.dispatch(AppAction::AddCallRecord(call.clone()));
        self.clear_current_call();
        Ok(CallOutcome::Completed(call))
    }

    /// Apply session events until the hold time is up and the session has
    /// delivered everything it scripted
    async fn hold_realtime(
        &self,
        call: &mut CallRecord,
        mut events: UnboundedReceiver<RealtimeEvent>,
    ) {
        let deadline = Instant::now() + self.timings.realtime_hold();
        let mut open = true;
        let mut held = false;

        while open || !held {
            tokio::select! {
                biased;
                event = events.recv(), if open => match event {
                    Some(RealtimeEvent::Transcript(text)) => {
                        self.set_stage(CallStage::Transcribing, call);
                        call.transcript = text;
                        self.publish(call);
                    }
                    Some(RealtimeEvent::AiResponse(text)) => {
                        self.set_stage(CallStage::Responding, call);
                        call.ai_responses.push(text);
                        self.publish(call);
                    }
                    None => open = false,
                },
                _ = sleep_until(deadline), if !held => held = true,
            }
        }
    }

    async fn converse_direct(
        &self,
        call: &mut CallRecord,
        api_key: Option<&str>,
        training: &str,
        caller_info: &str,
    ) -> Result<()> {
        sleep(self.timings.pre_transcribe()).await;

        self.set_stage(CallStage::Transcribing, call);
        call.transcript = self.transcriber.transcribe(&[]).await?;
        self.publish(call);

        self.set_stage(CallStage::Responding, call);
        let response = self
            .generator
            .generate_response(api_key, training, caller_info, &call.transcript)
            .await;
        call.ai_responses.push(response);
        self.publish(call);
        Ok(())
    }
}
