//! Timer-expired alert

use std::sync::Mutex;

use tracing::{info, warn};

use crate::state::{CountdownObserver, Expiration};

/// Alert presenter. Holds the expiration message until it is dismissed.
#[derive(Debug, Default)]
pub struct AlertWindow {
    message: Mutex<Option<String>>,
}

impl AlertWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.message().is_some()
    }

    /// Message currently shown, if the alert is up
    pub fn message(&self) -> Option<String> {
        self.message.lock().ok().and_then(|m| m.clone())
    }
}

impl CountdownObserver for AlertWindow {
    fn on_expired(&self, expiration: &Expiration) {
        if !expiration.show_alert_window {
            return;
        }
        warn!("Countdown expired: {}", expiration.announcement_text);
        if let Ok(mut message) = self.message.lock() {
            *message = Some(expiration.announcement_text.clone());
        }
    }

    fn on_alert_dismissed(&self) {
        if let Ok(mut message) = self.message.lock() {
            if message.take().is_some() {
                info!("Alert closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{PreferenceKey, Preferences};

    #[test]
    fn shows_until_dismissed() {
        let alert = AlertWindow::new();
        let expiration = Expiration::from_preferences(&Preferences::in_memory(), 1, 60);

        alert.on_expired(&expiration);
        assert!(alert.is_visible());
        assert_eq!(alert.message(), Some(expiration.announcement_text.clone()));

        alert.on_alert_dismissed();
        assert!(!alert.is_visible());
    }

    #[test]
    fn respects_show_alert_window() {
        let prefs = Preferences::in_memory();
        prefs.set(PreferenceKey::ShowAlertWindow, false).unwrap();
        let alert = AlertWindow::new();
        alert.on_expired(&Expiration::from_preferences(&prefs, 1, 60));
        assert!(!alert.is_visible());
    }
}
