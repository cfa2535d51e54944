//! Alert sound and spoken announcement

use std::{io::Write, sync::Arc};

use tokio::{process::Command, runtime::Handle, sync::watch};
use tracing::{debug, error, info, warn};

use crate::{
    state::{CountdownObserver, CountdownSnapshot, Expiration},
    tasks::alert_sound_repeat_task,
};

/// Plays sounds and speaks text. Both calls must return immediately.
pub trait AnnouncementBackend: Send + Sync {
    fn play_alert_sound(&self);
    fn speak(&self, text: &str);
}

/// External program plus its leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Split a command line on whitespace. Empty input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Platform sound player
    pub fn default_sound() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Self::parse("afplay /System/Library/Sounds/Glass.aiff")
        } else if cfg!(target_os = "linux") {
            Self::parse("paplay /usr/share/sounds/freedesktop/stereo/complete.oga")
        } else {
            None
        }
    }

    /// Platform speech synthesizer; the text is appended as the last argument
    pub fn default_speech() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Self::parse("say")
        } else if cfg!(target_os = "linux") {
            Self::parse("espeak")
        } else {
            None
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Run a command to completion
async fn run_command(command: CommandLine, extra_arg: Option<String>) -> Result<(), String> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);
    if let Some(arg) = extra_arg {
        cmd.arg(arg);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", command.program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", command.program, stderr.trim()));
    }
    Ok(())
}

/// Fire and forget a command on the current runtime
fn spawn_command(command: CommandLine, extra_arg: Option<String>) {
    let Ok(handle) = Handle::try_current() else {
        warn!("No async runtime, not running {}", command.program);
        return;
    };
    handle.spawn(async move {
        if let Err(e) = run_command(command, extra_arg).await {
            error!("{}", e);
        }
    });
}

/// Backend running external programs for sound and speech
#[derive(Debug, Clone)]
pub struct CommandBackend {
    sound: Option<CommandLine>,
    speech: Option<CommandLine>,
}

impl CommandBackend {
    pub fn new(sound: Option<CommandLine>, speech: Option<CommandLine>) -> Self {
        Self { sound, speech }
    }
}

impl AnnouncementBackend for CommandBackend {
    fn play_alert_sound(&self) {
        match &self.sound {
            Some(command) => {
                debug!("Playing alert sound with {}", command.program);
                spawn_command(command.clone(), None);
            }
            None => {
                // Terminal bell
                let mut stdout = std::io::stdout();
                let _ = stdout.write_all(b"\x07");
                let _ = stdout.flush();
            }
        }
    }

    fn speak(&self, text: &str) {
        match &self.speech {
            Some(command) => {
                debug!("Speaking announcement \"{}\"", text);
                spawn_command(command.clone(), Some(text.to_string()));
            }
            None => warn!("No speech synthesizer configured, announcement skipped"),
        }
    }
}

/// Expiration collaborator for the sound and speech channels
pub struct Announcer {
    backend: Arc<dyn AnnouncementBackend>,
    snapshots: watch::Receiver<CountdownSnapshot>,
}

impl Announcer {
    pub fn new(
        backend: Arc<dyn AnnouncementBackend>,
        snapshots: watch::Receiver<CountdownSnapshot>,
    ) -> Self {
        Self { backend, snapshots }
    }
}

impl CountdownObserver for Announcer {
    fn on_expired(&self, expiration: &Expiration) {
        if expiration.play_alert_sound {
            self.backend.play_alert_sound();

            if expiration.repeat_alert_sound {
                match Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(alert_sound_repeat_task(
                            Arc::clone(&self.backend),
                            self.snapshots.clone(),
                            expiration.session,
                            expiration.alert_sound_repeat_interval,
                        ));
                    }
                    Err(_) => warn!("No async runtime, alert sound will not repeat"),
                }
            }
        }

        if expiration.announce {
            info!("Announcing expiration");
            self.backend.speak(&expiration.announcement_text);
        }
    }
}
