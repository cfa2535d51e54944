//! Countdown collaborators module
//!
//! This module contains the display, alert, sound/speech and desktop
//! notification collaborators the countdown reports to.

pub mod alert;
pub mod announcer;
pub mod display;
pub mod notification;

// Re-export main types
pub use alert::AlertWindow;
pub use announcer::{AnnouncementBackend, Announcer, CommandBackend, CommandLine};
pub use display::{format_title, StatusDisplay};
pub use notification::{DesktopNotifier, NotificationBackend, NotifierKind, NotifyRustBackend};
