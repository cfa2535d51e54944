//! Status display: the countdown title shown in place of the menubar item

use std::sync::Mutex;

use tracing::{debug, info};

use crate::{
    preferences::{PreferenceKey, Preferences, TimerSetting},
    state::{CountdownObserver, CountdownPhase, CountdownSnapshot, Expiration},
};

/// Format remaining time as `HH:MM:SS`, or as `HH:MM` rounded up to the next
/// whole minute when seconds are hidden
pub fn format_title(remaining_seconds: u64, show_seconds: bool) -> String {
    let remaining = if show_seconds {
        remaining_seconds
    } else {
        remaining_seconds.div_ceil(60) * 60
    };

    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    if show_seconds {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", hours, minutes)
    }
}

#[derive(Debug, Default)]
struct DisplayState {
    /// `None` while idle: the icon is shown instead of a title
    title: Option<String>,
    blinking: bool,
}

/// Display sink keeping the current title and blink state
#[derive(Debug)]
pub struct StatusDisplay {
    preferences: Preferences,
    state: Mutex<DisplayState>,
}

impl StatusDisplay {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            state: Mutex::new(DisplayState::default()),
        }
    }

    /// Current title, or `None` when the icon is showing
    pub fn title(&self) -> Option<String> {
        self.state.lock().ok().and_then(|s| s.title.clone())
    }

    pub fn is_blinking(&self) -> bool {
        self.state.lock().map(|s| s.blinking).unwrap_or(false)
    }
}

impl CountdownObserver for StatusDisplay {
    fn on_state_changed(&self, snapshot: &CountdownSnapshot) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match snapshot.phase {
            CountdownPhase::Idle => {
                if state.title.is_some() {
                    info!("Countdown title hidden");
                }
                state.title = None;
                state.blinking = false;
            }
            CountdownPhase::Running => {
                state.blinking = false;
                // Placeholder until on_remaining_changed formats the real value
                state.title.get_or_insert_with(String::new);
            }
            CountdownPhase::Paused | CountdownPhase::Expired => {}
        }
    }

    fn on_remaining_changed(&self, remaining_seconds: u64) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.title.is_none() {
            return;
        }
        let show_seconds = self.preferences.bool(PreferenceKey::ShowSecondsInMenubar);
        let title = format_title(remaining_seconds, show_seconds);
        if state.title.as_deref() != Some(title.as_str()) {
            debug!("Countdown title: {}", title);
            state.title = Some(title);
        }
    }

    fn on_expired(&self, expiration: &Expiration) {
        if let Ok(mut state) = self.state.lock() {
            state.blinking = expiration.blink;
        }
    }

    fn on_start_prompt_requested(&self, suggested: &TimerSetting) {
        info!(
            "Ready for a new countdown (suggested {:02}:{:02}:{:02})",
            suggested.hours, suggested.minutes, suggested.seconds
        );
    }
}
