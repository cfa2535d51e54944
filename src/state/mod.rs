//! State management module
//!
//! This module contains the countdown state machine, the snapshots it
//! publishes, and the shared application state wrapping it.

pub mod app_state;
pub mod countdown;
pub mod observer;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown::{CountdownController, TickOutcome};
pub use observer::{CountdownObserver, Expiration};
pub use timer_state::{CountdownPhase, CountdownSnapshot};
