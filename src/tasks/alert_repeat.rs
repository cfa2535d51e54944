//! Repeating alert sound background task

use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, time::interval};
use tracing::{debug, info};

use crate::{
    services::AnnouncementBackend,
    state::{CountdownPhase, CountdownSnapshot},
};

/// The alert for `session` is still unacknowledged.
///
/// The snapshot may still show the session as running for a moment, because
/// collaborators hear about expiry before the snapshot is published.
fn alert_pending(snapshot: &CountdownSnapshot, session: u64) -> bool {
    snapshot.session == session && snapshot.phase != CountdownPhase::Idle
}

/// Replay the alert sound every `interval_secs` until the expiration of
/// `session` is dismissed, stopped or replaced by a new run
pub async fn alert_sound_repeat_task(
    backend: Arc<dyn AnnouncementBackend>,
    mut snapshots: watch::Receiver<CountdownSnapshot>,
    session: u64,
    interval_secs: u64,
) {
    info!("Repeating alert sound every {}s", interval_secs);

    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));
    // First tick is immediate; the initial sound has already played
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !alert_pending(&snapshots.borrow(), session) {
                    break;
                }
                debug!("Replaying alert sound");
                backend.play_alert_sound();
            }
            changed = snapshots.changed() => {
                if changed.is_err() || !alert_pending(&snapshots.borrow_and_update(), session) {
                    break;
                }
            }
        }
    }

    debug!("Alert sound repeat for session {} finished", session);
}
