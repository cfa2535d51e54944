//! Error types for countdown commands

use crate::state::CountdownPhase;

/// Rejections returned by countdown commands.
///
/// A rejected command never changes controller state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountdownError {
    #[error("countdown duration must be positive, got {0} seconds")]
    InvalidDuration(i64),
    #[error("countdown is not running (currently {0})")]
    NotRunning(CountdownPhase),
    #[error("countdown is not paused (currently {0})")]
    NotPaused(CountdownPhase),
    #[error("countdown has not expired (currently {0})")]
    NotExpired(CountdownPhase),
    #[error("countdown state lock poisoned: {0}")]
    StatePoisoned(String),
}
