//! Periodic driver that expires phase deadlines across every live game.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawn the background tick loop. Each cycle calls `tick_all`, which logs
/// and skips any game whose transition fails. The loop exits when the
/// shutdown channel fires.
pub fn spawn_game_ticker(
    state: Arc<AppState>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Overlapping or late invocations are harmless since tick is
        // idempotent; skip missed ticks instead of bursting.
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    state.tick_all().await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("game ticker shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::content::{BribeLibrary, PromptLibrary};

    #[tokio::test]
    async fn ticker_stops_on_shutdown_signal() {
        let state = Arc::new(AppState::new(
            Arc::new(SystemClock),
            PromptLibrary::default_library(),
            BribeLibrary::default_library(),
        ));
        let (tx, rx) = watch::channel(false);

        let handle = spawn_game_ticker(state, Duration::from_millis(10), rx);
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("ticker should exit promptly")
            .unwrap();
    }
}
