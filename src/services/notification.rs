//! Desktop notification on expiration

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::state::{CountdownObserver, Expiration};

const NOTIFICATION_TITLE: &str = "Menubar Countdown Expired";
const APP_NAME: &str = "Menubar Countdown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    NotifyRust,
    LogOnly,
}

/// Shows one desktop notification. May block.
pub trait NotificationBackend: Send + Sync {
    fn show(&self, summary: &str, body: &str, with_sound: bool) -> Result<(), String>;
}

/// System notification service through notify-rust
#[derive(Debug, Default)]
pub struct NotifyRustBackend;

#[cfg(target_os = "macos")]
fn request_sound(notification: &mut notify_rust::Notification) {
    notification.sound_name("default");
}

#[cfg(all(unix, not(target_os = "macos")))]
fn request_sound(notification: &mut notify_rust::Notification) {
    notification.hint(notify_rust::Hint::SoundName("message-new-instant".to_string()));
}

#[cfg(not(unix))]
fn request_sound(_notification: &mut notify_rust::Notification) {}

impl NotificationBackend for NotifyRustBackend {
    fn show(&self, summary: &str, body: &str, with_sound: bool) -> Result<(), String> {
        let mut notification = notify_rust::Notification::new();
        notification.appname(APP_NAME).summary(summary).body(body);
        if with_sound {
            request_sound(&mut notification);
        }
        notification
            .show()
            .map(|_| ())
            .map_err(|e| format!("notify-rust failed: {}", e))
    }
}

/// Desktop notification dispatcher.
///
/// Starts out using the notification backend; the first failure downgrades
/// it to logging the announcement instead.
pub struct DesktopNotifier {
    backend: Arc<dyn NotificationBackend>,
    log_only: Arc<AtomicBool>,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new(NotifierKind::NotifyRust)
    }
}

impl DesktopNotifier {
    pub fn new(kind: NotifierKind) -> Self {
        Self::with_backend(kind, Arc::new(NotifyRustBackend))
    }

    pub fn with_backend(kind: NotifierKind, backend: Arc<dyn NotificationBackend>) -> Self {
        debug!("Desktop notifier created: {:?}", kind);
        Self {
            backend,
            log_only: Arc::new(AtomicBool::new(kind == NotifierKind::LogOnly)),
        }
    }

    pub fn kind(&self) -> NotifierKind {
        if self.log_only.load(Ordering::SeqCst) {
            NotifierKind::LogOnly
        } else {
            NotifierKind::NotifyRust
        }
    }
}

impl std::fmt::Debug for DesktopNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopNotifier")
            .field("kind", &self.kind())
            .finish()
    }
}

impl CountdownObserver for DesktopNotifier {
    fn on_expired(&self, expiration: &Expiration) {
        if !expiration.show_notification {
            return;
        }

        let body = expiration.announcement_text.clone();
        if self.kind() == NotifierKind::LogOnly {
            info!("[NOTIFICATION] {}: {}", NOTIFICATION_TITLE, body);
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime, notification logged only");
            info!("[NOTIFICATION] {}: {}", NOTIFICATION_TITLE, body);
            return;
        };

        let with_sound = expiration.play_notification_sound;
        let backend = Arc::clone(&self.backend);
        let log_only = Arc::clone(&self.log_only);
        // Showing a notification can block on the session bus
        handle.spawn_blocking(move || match backend.show(NOTIFICATION_TITLE, &body, with_sound) {
            Ok(()) => debug!("Expiration notification shown"),
            Err(e) => {
                warn!(error = %e, "Desktop notification failed; downgrading to LogOnly notifier");
                log_only.store(true, Ordering::SeqCst);
                info!("[NOTIFICATION] {}: {}", NOTIFICATION_TITLE, body);
            }
        });
    }
}
