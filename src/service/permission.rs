//! Call permission check
//!
//! Stands in for the OS-level permission to answer calls. There is no
//! platform integration; the probe reports a configured outcome after a
//! fixed delay.

use crate::{Result, WhispererError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// What the probe reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOutcome {
    #[default]
    Granted,
    Denied,
    /// The check itself fails
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct PermissionProbe {
    outcome: PermissionOutcome,
    delay: Duration,
}

impl PermissionProbe {
    pub fn new(outcome: PermissionOutcome, delay: Duration) -> Self {
        Self { outcome, delay }
    }

    pub fn granted(delay: Duration) -> Self {
        Self::new(PermissionOutcome::Granted, delay)
    }

    /// Ask whether calls may be answered
    pub async fn check_call_permissions(&self) -> Result<bool> {
        info!("Checking call permissions...");
        sleep(self.delay).await;
        match self.outcome {
            PermissionOutcome::Granted => Ok(true),
            PermissionOutcome::Denied => {
                warn!("Call permission denied");
                Ok(false)
            }
            PermissionOutcome::Unavailable => Err(WhispererError::PermissionDeniedError(
                "permission service unavailable".to_string(),
            )),
        }
    }
}
