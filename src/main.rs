use anyhow::{Context, Result};
use call_whisperer::{CallOutcome, CallWhisperer, LogNotifier, WhispererConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_ENV: &str = "CALL_WHISPERER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "call-whisperer.toml";
const DEMO_TRAINING: &str =
    "We are open Monday to Friday, 9am to 5pm. Appointments can be booked for any weekday.";

fn load_config() -> Result<WhispererConfig> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        });

    match path {
        Some(path) => WhispererConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(WhispererConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    // Initialize tracing
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| "call_whisperer=debug,info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = CallWhisperer::new(&config, Arc::new(LogNotifier))?;
    info!(mode = ?app.simulator().mode(), "Starting Call Whisperer");
    app.start();

    if !app.store().read().has_api_key() {
        let key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "sk-demo".to_string());
        app.save_api_key(key);
    }
    if app.store().read().training_data.is_empty() {
        app.add_training(DEMO_TRAINING)?;
    }

    if !app.set_auto_answer(true).await {
        warn!("Auto-answer is off, the simulated call will not be answered");
    }

    match app.simulate_incoming_call().await {
        CallOutcome::Completed(record) => info!(
            caller = %record.caller_label(),
            duration = %record.formatted_duration(),
            transcript = %record.transcript,
            "Call recorded"
        ),
        CallOutcome::Missed => info!("Call was not answered"),
        CallOutcome::Rejected(e) | CallOutcome::ConnectionFailed(e) | CallOutcome::Failed(e) => {
            warn!(error = %e, "{}", e.user_message())
        }
    }

    for record in app.store().call_history() {
        info!(
            time = %record.timestamp.format("%Y-%m-%d %H:%M"),
            caller = %record.caller_label(),
            duration = %record.formatted_duration(),
            responses = record.ai_responses.len(),
            "history"
        );
    }

    Ok(())
}
