//! Countdown phase and snapshot structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the countdown is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CountdownPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Expired,
}

impl CountdownPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownPhase::Idle => "idle",
            CountdownPhase::Running => "running",
            CountdownPhase::Paused => "paused",
            CountdownPhase::Expired => "expired",
        }
    }
}

impl fmt::Display for CountdownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the countdown state, handed to observers and the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub phase: CountdownPhase,
    /// Duration the current run counts down from
    pub setting_seconds: u64,
    pub remaining_seconds: u64,
    /// Increments every time a new run begins
    pub session: u64,
}

impl CountdownSnapshot {
    /// Snapshot of a controller that has never run
    pub fn new() -> Self {
        Self {
            phase: CountdownPhase::Idle,
            setting_seconds: 0,
            remaining_seconds: 0,
            session: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == CountdownPhase::Paused
    }

    pub fn can_pause(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    /// Paused with time left on the clock
    pub fn can_resume(&self) -> bool {
        self.phase == CountdownPhase::Paused && self.remaining_seconds > 0
    }

    pub fn has_expired(&self) -> bool {
        self.phase == CountdownPhase::Expired
    }
}

impl Default for CountdownSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
