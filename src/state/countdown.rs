//! Countdown state machine
//!
//! Remaining time is always recomputed as the run's setting minus the whole
//! seconds measured by the stopwatch, never decremented per tick, so a late
//! or skipped tick cannot make the countdown drift.

use std::{sync::Arc, time::Duration};

use tracing::{debug, info};

use super::{CountdownObserver, CountdownPhase, CountdownSnapshot, Expiration};
use crate::{
    clock::{MonotonicClock, Stopwatch},
    error::CountdownError,
    preferences::Preferences,
};

/// Result of delivering a tick to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or the tick belongs to an earlier run
    Ignored,
    Running { remaining_seconds: u64 },
    Expired,
}

/// Owns the countdown state and drives its transitions
pub struct CountdownController {
    stopwatch: Stopwatch,
    preferences: Preferences,
    observers: Vec<Arc<dyn CountdownObserver>>,
    phase: CountdownPhase,
    setting_seconds: u64,
    remaining_seconds: u64,
    session: u64,
}

impl CountdownController {
    pub fn new(clock: Arc<dyn MonotonicClock>, preferences: Preferences) -> Self {
        Self {
            stopwatch: Stopwatch::new(clock),
            preferences,
            observers: Vec::new(),
            phase: CountdownPhase::Idle,
            setting_seconds: 0,
            remaining_seconds: 0,
            session: 0,
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn CountdownObserver>) {
        self.observers.push(observer);
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn setting_seconds(&self) -> u64 {
        self.setting_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    pub fn can_resume(&self) -> bool {
        self.snapshot().can_resume()
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            phase: self.phase,
            setting_seconds: self.setting_seconds,
            remaining_seconds: self.remaining_seconds,
            session: self.session,
        }
    }

    /// Begin counting down from `seconds`.
    ///
    /// Accepted from any phase; a run in progress is replaced and an
    /// expiration alert is dismissed.
    pub fn start(&mut self, seconds: i64) -> Result<CountdownSnapshot, CountdownError> {
        if seconds <= 0 {
            return Err(CountdownError::InvalidDuration(seconds));
        }
        let duration = seconds as u64;

        if self.phase != CountdownPhase::Idle {
            info!("Restarting countdown that was {}", self.phase);
        }
        let alert_was_showing = self.phase == CountdownPhase::Expired;

        self.begin_run(duration);
        info!("Countdown started: {}s (session {})", duration, self.session);

        if alert_was_showing {
            self.notify(|o| o.on_alert_dismissed());
        }
        self.notify_state_changed();
        Ok(self.snapshot())
    }

    /// Start with the duration configured in preferences
    pub fn start_from_preferences(&mut self) -> Result<CountdownSnapshot, CountdownError> {
        let setting = self.preferences.timer_setting();
        self.start(setting.total_seconds())
    }

    /// Deliver a tick for the current run
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_session(self.session)
    }

    /// Deliver a tick scheduled for `session`.
    ///
    /// Ticks for any other session, or arriving while not running, are ignored.
    pub fn tick_session(&mut self, session: u64) -> TickOutcome {
        if self.phase != CountdownPhase::Running || session != self.session {
            debug!(
                "Ignoring tick for session {} (current session {}, {})",
                session, self.session, self.phase
            );
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.measure_remaining();
        if self.remaining_seconds == 0 {
            self.expire();
            return TickOutcome::Expired;
        }

        debug!("Tick: {}s remaining", self.remaining_seconds);
        let remaining = self.remaining_seconds;
        self.notify(|o| o.on_remaining_changed(remaining));
        TickOutcome::Running {
            remaining_seconds: remaining,
        }
    }

    /// Delay until the measured elapsed time crosses the next whole second,
    /// or `None` when nothing should tick
    pub fn next_tick_delay(&self) -> Option<Duration> {
        if self.phase != CountdownPhase::Running {
            return None;
        }
        Some(Duration::from_nanos(self.stopwatch.nanos_to_next_second()))
    }

    /// Freeze the countdown.
    ///
    /// If the time is already up the countdown expires instead.
    pub fn pause(&mut self) -> Result<CountdownSnapshot, CountdownError> {
        if self.phase != CountdownPhase::Running {
            return Err(CountdownError::NotRunning(self.phase));
        }

        self.remaining_seconds = self.measure_remaining();
        if self.remaining_seconds == 0 {
            self.expire();
            return Ok(self.snapshot());
        }

        self.phase = CountdownPhase::Paused;
        info!("Countdown paused with {}s remaining", self.remaining_seconds);
        self.notify_state_changed();
        Ok(self.snapshot())
    }

    /// Continue a paused countdown from where it stopped
    pub fn resume(&mut self) -> Result<CountdownSnapshot, CountdownError> {
        if !self.can_resume() {
            return Err(CountdownError::NotPaused(self.phase));
        }

        self.begin_run(self.remaining_seconds);
        info!(
            "Countdown resumed with {}s remaining (session {})",
            self.remaining_seconds, self.session
        );
        self.notify_state_changed();
        Ok(self.snapshot())
    }

    /// Return to idle from any phase. Stopping while idle does nothing.
    pub fn stop(&mut self) -> Result<CountdownSnapshot, CountdownError> {
        if self.phase == CountdownPhase::Idle {
            debug!("Stop requested while idle");
            return Ok(self.snapshot());
        }

        let alert_was_showing = self.phase == CountdownPhase::Expired;
        info!("Countdown stopped ({}s remaining)", self.remaining_seconds);
        self.phase = CountdownPhase::Idle;
        self.remaining_seconds = 0;

        if alert_was_showing {
            self.notify(|o| o.on_alert_dismissed());
        }
        self.notify_state_changed();
        Ok(self.snapshot())
    }

    /// Acknowledge an expired countdown
    pub fn dismiss(&mut self) -> Result<CountdownSnapshot, CountdownError> {
        if self.phase != CountdownPhase::Expired {
            return Err(CountdownError::NotExpired(self.phase));
        }

        info!("Expiration alert dismissed");
        self.phase = CountdownPhase::Idle;
        self.notify(|o| o.on_alert_dismissed());
        self.notify_state_changed();
        Ok(self.snapshot())
    }

    /// Dismiss whatever is showing and immediately count down again from the
    /// duration stored in preferences
    pub fn restart(&mut self) -> Result<CountdownSnapshot, CountdownError> {
        info!("Restart requested");
        self.start_from_preferences()
    }

    /// The desktop notification was clicked: acknowledge an expired
    /// countdown and ask the user for the next duration. Nothing starts.
    pub fn notification_clicked(&mut self) -> Result<CountdownSnapshot, CountdownError> {
        info!("Expiration notification clicked");
        if self.phase == CountdownPhase::Expired {
            self.dismiss()?;
        }
        self.request_start_prompt();
        Ok(self.snapshot())
    }

    /// Ask observers to prompt for a duration, suggesting the stored setting
    pub fn request_start_prompt(&self) {
        let suggested = self.preferences.timer_setting();
        debug!("Requesting start prompt ({}s suggested)", suggested.total_seconds());
        self.notify(|o| o.on_start_prompt_requested(&suggested));
    }

    fn begin_run(&mut self, duration: u64) {
        self.session += 1;
        self.setting_seconds = duration;
        self.remaining_seconds = duration;
        self.stopwatch.reset();
        self.phase = CountdownPhase::Running;
    }

    fn measure_remaining(&self) -> u64 {
        self.setting_seconds
            .saturating_sub(self.stopwatch.elapsed_whole_seconds())
    }

    fn expire(&mut self) {
        self.phase = CountdownPhase::Expired;
        self.remaining_seconds = 0;
        info!(
            "Countdown expired after {}s (session {})",
            self.setting_seconds, self.session
        );

        let expiration =
            Expiration::from_preferences(&self.preferences, self.session, self.setting_seconds);
        self.notify_state_changed();
        self.notify(|o| o.on_expired(&expiration));
    }

    fn notify_state_changed(&self) {
        let snapshot = self.snapshot();
        self.notify(|o| {
            o.on_state_changed(&snapshot);
            o.on_remaining_changed(snapshot.remaining_seconds);
        });
    }

    fn notify<F>(&self, f: F)
    where
        F: Fn(&dyn CountdownObserver),
    {
        for observer in &self.observers {
            f(observer.as_ref());
        }
    }
}

impl std::fmt::Debug for CountdownController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownController")
            .field("phase", &self.phase)
            .field("setting_seconds", &self.setting_seconds)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("session", &self.session)
            .field("observers", &self.observers.len())
            .finish()
    }
}
