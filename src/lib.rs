//! Menubar Countdown - A countdown timer that alerts when it reaches zero
//!
//! This library provides the countdown state machine, its monotonic time
//! measurement, the collaborators notified on expiration, and a local HTTP
//! control API.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod preferences;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use clock::{ManualClock, MonotonicClock, Stopwatch, SystemClock};
pub use config::Config;
pub use error::CountdownError;
pub use preferences::{PreferenceKey, Preferences};
pub use state::{AppState, CountdownController, CountdownPhase, CountdownSnapshot};
pub use utils::signals::shutdown_signal;
