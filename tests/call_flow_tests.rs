//! End-to-end call scenarios driven through the public API
//!
//! These tests wire the store, notifier and simulator together the way the
//! binary does and check what a front end would observe.

use call_whisperer::simulator::CallerRoster;
use call_whisperer::state::MAX_CALL_HISTORY;
use call_whisperer::{
    AppAction, CallOutcome, CallRecord, CallSimulator, CallWhisperer, Caller, ChannelNotifier,
    Notice, SimulationMode, SimulatorTimings, Store, WhispererConfig,
};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::time::Duration;

fn direct_config() -> WhispererConfig {
    WhispererConfig::default()
        .with_mode(SimulationMode::Direct)
        .with_timings(SimulatorTimings::instant())
        .in_memory()
}

fn app_with(config: WhispererConfig) -> (CallWhisperer, Receiver<Notice>) {
    let (notifier, rx) = ChannelNotifier::new();
    let app = CallWhisperer::new(&config, Arc::new(notifier)).expect("valid config");
    (app, rx)
}

async fn ready(app: &CallWhisperer) {
    app.save_api_key("sk-test");
    app.add_training("Offer appointments on weekdays only.")
        .expect("training accepted");
    assert!(app.set_auto_answer(true).await);
}

#[tokio::test]
async fn test_unknown_caller_is_recorded() {
    let store = Store::new();
    store.dispatch(AppAction::SetEnabled(true));
    store.dispatch(AppAction::SetApiKey(Some("sk-test".to_string())));

    let (notifier, rx) = ChannelNotifier::new();
    let simulator = CallSimulator::new(store.clone(), Arc::new(notifier))
        .with_mode(SimulationMode::Direct)
        .with_timings(SimulatorTimings::instant())
        .with_roster(CallerRoster::fixed(Caller::unknown("+1 555-741-9630")));

    let outcome = simulator.simulate_incoming_call().await;
    let record = outcome.record().expect("call completed").clone();

    assert_eq!(record.caller_name, None);
    assert_eq!(record.phone_number, "+1 555-741-9630");
    assert!(!record.transcript.is_empty());
    assert_eq!(record.ai_responses.len(), 1);
    assert!((20..=80).contains(&record.duration));

    let history = store.call_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], record);
    assert!(store.current_call().is_none());

    let titles: Vec<_> = rx.try_iter().map(|n| n.title).collect();
    assert!(titles.contains(&"Incoming call from +1 555-741-9630".to_string()));
}

#[tokio::test]
async fn test_full_session_through_facade() {
    let (app, _rx) = app_with(direct_config());
    ready(&app).await;
    assert!(app.can_simulate());

    let first = app.simulate_incoming_call().await;
    let second = app.simulate_incoming_call().await;
    assert!(first.is_completed());
    assert!(second.is_completed());

    let history = app.store().call_history();
    assert_eq!(history.len(), 2);
    // Newest first
    assert_eq!(Some(&history[0]), second.record());
    assert_eq!(Some(&history[1]), first.record());
    assert!(app.can_simulate());
}

#[tokio::test(start_paused = true)]
async fn test_disable_while_ringing() {
    let config = WhispererConfig::default()
        .with_mode(SimulationMode::Direct)
        .in_memory();
    let (app, rx) = app_with(config);
    ready(&app).await;

    let task = tokio::spawn({
        let app = app.clone();
        async move { app.simulate_incoming_call().await }
    });

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(app.store().current_call().is_some());
    assert!(!app.can_simulate());
    assert!(!app.set_auto_answer(false).await);

    let outcome = task.await.expect("call task");
    assert!(matches!(outcome, CallOutcome::Missed));
    assert!(app.store().current_call().is_none());
    assert!(app.store().call_history().is_empty());

    let titles: Vec<_> = rx.try_iter().map(|n| n.title).collect();
    assert!(titles.contains(&"Call not answered - Call Whisperer is disabled".to_string()));
    assert!(!titles.contains(&"Call ended".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_current_call_follows_direct_stages() {
    let config = WhispererConfig::default()
        .with_mode(SimulationMode::Direct)
        .in_memory();
    let (app, _rx) = app_with(config);
    ready(&app).await;

    let task = tokio::spawn({
        let app = app.clone();
        async move { app.simulate_incoming_call().await }
    });

    // Ringing (2s) plus the pause before transcription (2s)
    tokio::time::sleep(Duration::from_millis(3500)).await;
    let current = app.store().current_call().expect("call in flight");
    assert!(current.is_listening());
    assert_eq!(current.duration, 0);

    // Transcription lands a second after that
    tokio::time::sleep(Duration::from_millis(2000)).await;
    let current = app.store().current_call().expect("call in flight");
    assert!(!current.is_listening());
    assert!(current.ai_responses.is_empty());

    // Reply 1.5s after the transcript
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let current = app.store().current_call().expect("call in flight");
    assert_eq!(current.ai_responses.len(), 1);
    assert!(current
        .ai_responses[0]
        .starts_with("Hi there! This is an automated response."));

    let outcome = task.await.expect("call task");
    assert!(outcome.is_completed());
    assert!(app.store().current_call().is_none());
}

#[tokio::test]
async fn test_missing_key_blocks_simulation() {
    let (app, rx) = app_with(direct_config());
    assert!(!app.can_simulate());

    let outcome = app.simulate_incoming_call().await;
    assert!(matches!(outcome, CallOutcome::Rejected(_)));
    assert!(app.store().call_history().is_empty());

    let notice = rx.try_recv().expect("error notice");
    assert_eq!(
        notice.title,
        "Please add your OpenAI API key in settings before testing."
    );
}

#[tokio::test]
async fn test_history_capped_at_fifty() {
    let (app, _rx) = app_with(direct_config());
    for n in 0..(MAX_CALL_HISTORY + 5) {
        let mut record = CallRecord::new(&Caller::unknown(format!("+1 555-000-{:04}", n)));
        record.duration = 30;
        app.store().dispatch(AppAction::AddCallRecord(record));
    }

    ready(&app).await;
    let outcome = app.simulate_incoming_call().await;
    let record = outcome.record().expect("call completed").clone();

    let history = app.store().call_history();
    assert_eq!(history.len(), MAX_CALL_HISTORY);
    assert_eq!(history[0], record);
    assert_eq!(history[1].phone_number, "+1 555-000-0054");
    assert_eq!(
        history.last().map(|r| r.phone_number.as_str()),
        Some("+1 555-000-0006")
    );
}
