//! Background tasks module
//!
//! This module contains the background tasks that drive the countdown and
//! its expiration alerts.

pub mod alert_repeat;
pub mod ticker;

// Re-export main functions
pub use alert_repeat::alert_sound_repeat_task;
pub use ticker::countdown_ticker_task;
