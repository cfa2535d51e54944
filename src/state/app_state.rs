//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};
use tracing::{debug, info};

use super::{CountdownController, CountdownObserver, CountdownSnapshot, TickOutcome};
use crate::{
    clock::MonotonicClock,
    error::CountdownError,
    preferences::Preferences,
    services::{AlertWindow, StatusDisplay},
    tasks::countdown_ticker_task,
};

/// Ticker task driving one running session
#[derive(Debug)]
struct Ticker {
    session: u64,
    handle: JoinHandle<()>,
}

/// Shared application state: the countdown controller plus everything the
/// control API reports alongside it
#[derive(Debug)]
pub struct AppState {
    /// Countdown state machine; every transition holds this lock
    controller: Mutex<CountdownController>,
    pub preferences: Preferences,
    /// Built-in collaborators, always registered
    pub display: Arc<StatusDisplay>,
    pub alert: Arc<AlertWindow>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest snapshot after every command and tick
    snapshot_tx: watch::Sender<CountdownSnapshot>,
    ticker: Mutex<Option<Ticker>>,
    shutdown: Notify,
}

impl AppState {
    /// Create the application state around a fresh idle controller
    pub fn new(
        port: u16,
        host: String,
        clock: Arc<dyn MonotonicClock>,
        preferences: Preferences,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(CountdownSnapshot::new());
        let display = Arc::new(StatusDisplay::new(preferences.clone()));
        let alert = Arc::new(AlertWindow::new());

        let mut controller = CountdownController::new(clock, preferences.clone());
        controller.add_observer(display.clone());
        controller.add_observer(alert.clone());

        Self {
            controller: Mutex::new(controller),
            preferences,
            display,
            alert,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            ticker: Mutex::new(None),
            shutdown: Notify::new(),
        }
    }

    fn lock_controller(&self) -> Result<MutexGuard<'_, CountdownController>, CountdownError> {
        self.controller
            .lock()
            .map_err(|e| CountdownError::StatePoisoned(e.to_string()))
    }

    /// Register an additional collaborator
    pub fn add_observer(&self, observer: Arc<dyn CountdownObserver>) -> Result<(), CountdownError> {
        self.lock_controller()?.add_observer(observer);
        Ok(())
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<CountdownSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current countdown snapshot
    pub fn snapshot(&self) -> Result<CountdownSnapshot, CountdownError> {
        Ok(self.lock_controller()?.snapshot())
    }

    /// Apply a command to the controller, record it, publish the result and
    /// bring the ticker in line with the new phase.
    ///
    /// Publishing and ticker reconciliation happen under the controller lock
    /// so concurrent commands cannot apply them out of order. Lock order is
    /// controller, then ticker.
    fn apply<F>(
        self: &Arc<Self>,
        action: &str,
        command: F,
    ) -> Result<CountdownSnapshot, CountdownError>
    where
        F: FnOnce(&mut CountdownController) -> Result<CountdownSnapshot, CountdownError>,
    {
        let mut controller = self.lock_controller()?;
        let snapshot = command(&mut *controller)?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.snapshot_tx.send_replace(snapshot.clone());
        self.sync_ticker(&controller);
        Ok(snapshot)
    }

    /// Spawn a ticker for a new running session, or cancel the one that is
    /// no longer wanted. Callers hold the controller lock.
    fn sync_ticker(self: &Arc<Self>, controller: &CountdownController) {
        let Ok(mut ticker) = self.ticker.lock() else {
            return;
        };

        let wanted = controller.is_running().then_some(controller.session());
        if ticker.as_ref().map(|t| t.session) == wanted {
            return;
        }

        if let Some(old) = ticker.take() {
            debug!("Cancelling ticker for session {}", old.session);
            old.handle.abort();
        }

        if let Some(session) = wanted {
            debug!("Spawning ticker for session {}", session);
            let state = Arc::clone(self);
            let handle = tokio::spawn(async move {
                countdown_ticker_task(state, session).await;
            });
            *ticker = Some(Ticker { session, handle });
        }
    }

    /// Start counting down from `seconds`
    pub fn start(self: &Arc<Self>, seconds: i64) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("start", |c| c.start(seconds))
    }

    /// Start with the duration stored in preferences
    pub fn start_from_preferences(self: &Arc<Self>) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("start", |c| c.start_from_preferences())
    }

    pub fn stop(self: &Arc<Self>) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("stop", |c| c.stop())
    }

    pub fn pause(self: &Arc<Self>) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("pause", |c| c.pause())
    }

    pub fn resume(self: &Arc<Self>) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("resume", |c| c.resume())
    }

    pub fn dismiss(self: &Arc<Self>) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("dismiss", |c| c.dismiss())
    }

    pub fn restart(self: &Arc<Self>) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("restart", |c| c.restart())
    }

    pub fn notification_clicked(self: &Arc<Self>) -> Result<CountdownSnapshot, CountdownError> {
        self.apply("notification-clicked", |c| c.notification_clicked())
    }

    /// Ask collaborators to prompt for a duration
    pub fn request_start_prompt(&self) -> Result<(), CountdownError> {
        self.lock_controller()?.request_start_prompt();
        Ok(())
    }

    /// Deliver a tick scheduled for `session`
    pub fn tick(&self, session: u64) -> Result<TickOutcome, CountdownError> {
        let mut controller = self.lock_controller()?;
        let outcome = controller.tick_session(session);

        if outcome != TickOutcome::Ignored {
            self.snapshot_tx.send_replace(controller.snapshot());
        }
        if outcome == TickOutcome::Expired {
            // The ticker ends on its own after expiry
            if let Ok(mut ticker) = self.ticker.lock() {
                if ticker.as_ref().is_some_and(|t| t.session == session) {
                    ticker.take();
                }
            }
        }
        Ok(outcome)
    }

    /// Delay before the next tick of `session`, or `None` if that session is
    /// no longer running
    pub fn next_tick_delay(&self, session: u64) -> Option<Duration> {
        let controller = self.lock_controller().ok()?;
        if controller.session() != session {
            return None;
        }
        controller.next_tick_delay()
    }

    /// Whether a ticker task is currently scheduled
    pub fn ticker_active(&self) -> bool {
        self.ticker
            .lock()
            .map(|t| t.as_ref().is_some_and(|t| !t.handle.is_finished()))
            .unwrap_or(false)
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Ask the server to shut down
    pub fn request_shutdown(&self) {
        info!("Shutdown requested");
        self.shutdown.notify_one();
    }

    /// Resolves once `request_shutdown` has been called
    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await;
    }
}
