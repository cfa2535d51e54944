//! User preferences
//!
//! Preferences are a fixed, enumerated set of keys with typed values. The
//! countdown only ever reads them; the control API and tests write them.
//! Storage is pluggable through [`PreferenceStore`], and every key has a
//! registered default returned when the store holds nothing for it.

pub mod store;

use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

pub use store::{JsonFilePreferences, MemoryPreferences};

/// Spoken and shown when no announcement text has been configured
pub const DEFAULT_ANNOUNCEMENT_TEXT: &str = "The Menubar Countdown timer has reached zero.";

/// Every preference key the application recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreferenceKey {
    TimerHours,
    TimerMinutes,
    TimerSeconds,
    BlinkOnExpiration,
    PlayAlertSound,
    RepeatAlertSound,
    AlertSoundRepeatInterval,
    AnnounceExpiration,
    AnnouncementText,
    ShowAlertWindow,
    ShowNotification,
    PlayNotificationSound,
    ShowStartDialogOnLaunch,
    ShowSecondsInMenubar,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 14] = [
        PreferenceKey::TimerHours,
        PreferenceKey::TimerMinutes,
        PreferenceKey::TimerSeconds,
        PreferenceKey::BlinkOnExpiration,
        PreferenceKey::PlayAlertSound,
        PreferenceKey::RepeatAlertSound,
        PreferenceKey::AlertSoundRepeatInterval,
        PreferenceKey::AnnounceExpiration,
        PreferenceKey::AnnouncementText,
        PreferenceKey::ShowAlertWindow,
        PreferenceKey::ShowNotification,
        PreferenceKey::PlayNotificationSound,
        PreferenceKey::ShowStartDialogOnLaunch,
        PreferenceKey::ShowSecondsInMenubar,
    ];

    /// Persisted identifier of this key
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::TimerHours => "timer-hours",
            PreferenceKey::TimerMinutes => "timer-minutes",
            PreferenceKey::TimerSeconds => "timer-seconds",
            PreferenceKey::BlinkOnExpiration => "blink-on-expiration",
            PreferenceKey::PlayAlertSound => "play-alert-sound",
            PreferenceKey::RepeatAlertSound => "repeat-alert-sound",
            PreferenceKey::AlertSoundRepeatInterval => "alert-sound-repeat-interval",
            PreferenceKey::AnnounceExpiration => "announce-expiration",
            PreferenceKey::AnnouncementText => "announcement-text",
            PreferenceKey::ShowAlertWindow => "show-alert-window",
            PreferenceKey::ShowNotification => "show-notification",
            PreferenceKey::PlayNotificationSound => "play-notification-sound",
            PreferenceKey::ShowStartDialogOnLaunch => "show-start-dialog-on-launch",
            PreferenceKey::ShowSecondsInMenubar => "show-seconds-in-menubar",
        }
    }

    /// Value used when nothing is stored for this key
    pub fn default_value(&self) -> PreferenceValue {
        use PreferenceValue::{Bool, Integer, Text};
        match self {
            PreferenceKey::TimerHours => Integer(0),
            PreferenceKey::TimerMinutes => Integer(25),
            PreferenceKey::TimerSeconds => Integer(0),
            PreferenceKey::BlinkOnExpiration => Bool(true),
            PreferenceKey::PlayAlertSound => Bool(true),
            PreferenceKey::RepeatAlertSound => Bool(false),
            PreferenceKey::AlertSoundRepeatInterval => Integer(2),
            PreferenceKey::AnnounceExpiration => Bool(false),
            PreferenceKey::AnnouncementText => Text(DEFAULT_ANNOUNCEMENT_TEXT.to_string()),
            PreferenceKey::ShowAlertWindow => Bool(true),
            PreferenceKey::ShowNotification => Bool(true),
            PreferenceKey::PlayNotificationSound => Bool(false),
            PreferenceKey::ShowStartDialogOnLaunch => Bool(true),
            PreferenceKey::ShowSecondsInMenubar => Bool(true),
        }
    }

    /// Check that `value` has the right type and range for this key
    pub fn validate(&self, value: &PreferenceValue) -> Result<(), PreferenceError> {
        let expected = self.default_value();
        if std::mem::discriminant(&expected) != std::mem::discriminant(value) {
            return Err(PreferenceError::TypeMismatch {
                key: *self,
                expected: expected.type_name(),
                found: value.type_name(),
            });
        }

        let range = match self {
            PreferenceKey::TimerHours => Some(0..=99),
            PreferenceKey::TimerMinutes | PreferenceKey::TimerSeconds => Some(0..=59),
            PreferenceKey::AlertSoundRepeatInterval => Some(0..=3600),
            _ => None,
        };
        if let (Some(range), PreferenceValue::Integer(n)) = (range, value) {
            if !range.contains(n) {
                return Err(PreferenceError::OutOfRange {
                    key: *self,
                    value: *n,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreferenceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| PreferenceError::UnknownKey(s.to_string()))
    }
}

/// A stored preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl PreferenceValue {
    fn type_name(&self) -> &'static str {
        match self {
            PreferenceValue::Bool(_) => "boolean",
            PreferenceValue::Integer(_) => "integer",
            PreferenceValue::Text(_) => "text",
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Integer(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::Text(value.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("unknown preference key: {0}")]
    UnknownKey(String),
    #[error("preference {key} expects a {expected} value, got {found}")]
    TypeMismatch {
        key: PreferenceKey,
        expected: &'static str,
        found: &'static str,
    },
    #[error("preference {key} value {value} is outside {min}..={max}")]
    OutOfRange {
        key: PreferenceKey,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("preference store lock poisoned")]
    Poisoned,
    #[error("preference file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Backing storage for preference values
pub trait PreferenceStore: Send + Sync {
    /// Stored value for `key`, if any
    fn get(&self, key: PreferenceKey) -> Option<PreferenceValue>;

    /// Store `value` under `key`. Values are validated before they reach the store.
    fn set(&self, key: PreferenceKey, value: PreferenceValue) -> Result<(), PreferenceError>;
}

/// Hours, minutes and seconds of the configured countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSetting {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimerSetting {
    pub fn total_seconds(&self) -> i64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

/// Typed view over a [`PreferenceStore`] with registered defaults
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Preferences held only in memory, starting from defaults
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::new()))
    }

    /// Stored value, or the registered default
    pub fn get(&self, key: PreferenceKey) -> PreferenceValue {
        match self.store.get(key) {
            Some(value) if key.validate(&value).is_ok() => value,
            _ => key.default_value(),
        }
    }

    /// Validate and store a value
    pub fn set(
        &self,
        key: PreferenceKey,
        value: impl Into<PreferenceValue>,
    ) -> Result<(), PreferenceError> {
        let value = value.into();
        key.validate(&value)?;
        self.store.set(key, value)
    }

    pub fn bool(&self, key: PreferenceKey) -> bool {
        matches!(self.get(key), PreferenceValue::Bool(true))
    }

    pub fn integer(&self, key: PreferenceKey) -> i64 {
        match self.get(key) {
            PreferenceValue::Integer(n) => n,
            _ => 0,
        }
    }

    pub fn text(&self, key: PreferenceKey) -> String {
        match self.get(key) {
            PreferenceValue::Text(s) => s,
            _ => String::new(),
        }
    }

    /// Countdown duration configured by the user
    pub fn timer_setting(&self) -> TimerSetting {
        TimerSetting {
            hours: self.integer(PreferenceKey::TimerHours),
            minutes: self.integer(PreferenceKey::TimerMinutes),
            seconds: self.integer(PreferenceKey::TimerSeconds),
        }
    }

    /// Announcement text, falling back to the default when empty
    pub fn announcement_text(&self) -> String {
        let text = self.text(PreferenceKey::AnnouncementText);
        if text.trim().is_empty() {
            DEFAULT_ANNOUNCEMENT_TEXT.to_string()
        } else {
            text
        }
    }

    /// Seconds between alert sound repeats, never less than one
    pub fn alert_sound_repeat_interval(&self) -> u64 {
        self.integer(PreferenceKey::AlertSoundRepeatInterval).max(1) as u64
    }

    /// Effective values of every key
    pub fn snapshot(&self) -> BTreeMap<&'static str, PreferenceValue> {
        PreferenceKey::ALL
            .into_iter()
            .map(|key| (key.as_str(), self.get(key)))
            .collect()
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}
