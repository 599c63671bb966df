use crate::state::Caller;
use crate::{Result, WhispererError};
use rand::seq::SliceRandom;

/// Callers the simulator rings in with
pub const MOCK_CALLERS: [(Option<&str>, &str); 5] = [
    (Some("John Smith"), "+1 555-123-4567"),
    (Some("Mary Johnson"), "+1 555-987-6543"),
    (Some("Robert Brown"), "+1 555-246-8101"),
    (Some("Emma Wilson"), "+1 555-369-2580"),
    (None, "+1 555-741-9630"),
];

/// A non-empty list of callers picked from uniformly
#[derive(Debug, Clone)]
pub struct CallerRoster {
    callers: Vec<Caller>,
}

impl Default for CallerRoster {
    fn default() -> Self {
        Self {
            callers: MOCK_CALLERS
                .iter()
                .map(|(name, number)| Caller {
                    name: name.map(str::to_string),
                    number: number.to_string(),
                })
                .collect(),
        }
    }
}

impl CallerRoster {
    pub fn new(callers: Vec<Caller>) -> Result<Self> {
        if callers.is_empty() {
            return Err(WhispererError::ConfigError("caller roster is empty".to_string()));
        }
        Ok(Self { callers })
    }

    /// A roster that always rings with `caller`
    pub fn fixed(caller: Caller) -> Self {
        Self {
            callers: vec![caller],
        }
    }

    pub fn pick(&self) -> Caller {
        self.callers
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| Caller::unknown(MOCK_CALLERS[4].1))
    }

    pub fn callers(&self) -> &[Caller] {
        &self.callers
    }
}
