//! Collaborators notified by the countdown controller

use serde::Serialize;

use super::CountdownSnapshot;
use crate::preferences::{PreferenceKey, Preferences, TimerSetting};

/// Everything an expiration collaborator needs to know, read from
/// preferences at the moment the countdown expires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expiration {
    pub session: u64,
    pub setting_seconds: u64,
    pub announcement_text: String,
    pub blink: bool,
    pub play_alert_sound: bool,
    pub repeat_alert_sound: bool,
    pub alert_sound_repeat_interval: u64,
    pub announce: bool,
    pub show_alert_window: bool,
    pub show_notification: bool,
    pub play_notification_sound: bool,
}

impl Expiration {
    pub fn from_preferences(preferences: &Preferences, session: u64, setting_seconds: u64) -> Self {
        Self {
            session,
            setting_seconds,
            announcement_text: preferences.announcement_text(),
            blink: preferences.bool(PreferenceKey::BlinkOnExpiration),
            play_alert_sound: preferences.bool(PreferenceKey::PlayAlertSound),
            repeat_alert_sound: preferences.bool(PreferenceKey::RepeatAlertSound),
            alert_sound_repeat_interval: preferences.alert_sound_repeat_interval(),
            announce: preferences.bool(PreferenceKey::AnnounceExpiration),
            show_alert_window: preferences.bool(PreferenceKey::ShowAlertWindow),
            show_notification: preferences.bool(PreferenceKey::ShowNotification),
            play_notification_sound: preferences.bool(PreferenceKey::PlayNotificationSound),
        }
    }
}

/// Receives countdown events.
///
/// Callbacks run while the controller is locked, so implementations must
/// return quickly and must not call back into the controller. Anything slow
/// (processes, desktop notifications) gets spawned.
pub trait CountdownObserver: Send + Sync {
    /// Phase changed, or a new run began
    fn on_state_changed(&self, _snapshot: &CountdownSnapshot) {}

    /// Remaining time was recomputed
    fn on_remaining_changed(&self, _remaining_seconds: u64) {}

    /// Called exactly once per run that reaches zero
    fn on_expired(&self, _expiration: &Expiration) {}

    /// The expiration alert was acknowledged
    fn on_alert_dismissed(&self) {}

    /// The user should be asked for a countdown duration
    fn on_start_prompt_requested(&self, _suggested: &TimerSetting) {}
}
