//! Countdown ticker background task

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::state::{AppState, TickOutcome};

/// Tick one running session at each whole elapsed second until it stops
/// running, expires, or the task is aborted
pub async fn countdown_ticker_task(state: Arc<AppState>, session: u64) {
    debug!("Starting ticker for session {}", session);

    loop {
        let Some(delay) = state.next_tick_delay(session) else {
            debug!("Session {} no longer running, ticker exiting", session);
            break;
        };

        sleep(delay).await;

        match state.tick(session) {
            Ok(TickOutcome::Running { remaining_seconds }) => {
                debug!("Session {}: {}s remaining", session, remaining_seconds);
            }
            Ok(TickOutcome::Expired) => {
                info!("Session {} expired, ticker exiting", session);
                break;
            }
            Ok(TickOutcome::Ignored) => {
                debug!("Tick for session {} ignored, ticker exiting", session);
                break;
            }
            Err(e) => {
                error!("Failed to deliver tick: {}", e);
                break;
            }
        }
    }
}
