//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;

use crate::services::CommandLine;

/// Environment variable overriding the preference file location
pub const ENV_PREFERENCES: &str = "MENUBAR_COUNTDOWN_PREFERENCES";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "menubar-countdown")]
#[command(about = "A countdown timer with a local control API and expiration alerts")]
#[command(version)]
pub struct Config {
    /// Port to bind the control API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Preference file (JSON)
    #[arg(long)]
    pub preferences: Option<PathBuf>,

    /// Start a countdown of this many seconds on launch
    #[arg(short, long)]
    pub start: Option<i64>,

    /// Command that plays the alert sound
    #[arg(long)]
    pub sound_command: Option<String>,

    /// Command that speaks the announcement; the text is appended as the last argument
    #[arg(long)]
    pub speech_command: Option<String>,

    /// Log desktop notifications instead of showing them
    #[arg(long)]
    pub no_desktop_notifications: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Preference file: CLI value, then environment, then the platform config dir
    pub fn preferences_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.preferences {
            return Some(p.clone());
        }
        if let Ok(p) = std::env::var(ENV_PREFERENCES) {
            return Some(PathBuf::from(p));
        }
        default_preferences_path()
    }

    pub fn sound(&self) -> Option<CommandLine> {
        match &self.sound_command {
            Some(line) => CommandLine::parse(line),
            None => CommandLine::default_sound(),
        }
    }

    pub fn speech(&self) -> Option<CommandLine> {
        match &self.speech_command {
            Some(line) => CommandLine::parse(line),
            None => CommandLine::default_speech(),
        }
    }
}

pub fn default_preferences_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "menubar-countdown")?;
    Some(dirs.config_dir().join("preferences.json"))
}
