//! Stopwatch ticker background task

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Fixed period between ticks
const TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Interval whose first firing is one full period after activation
fn tick_interval() -> Interval {
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Background task that advances the stopwatch once per second while it runs
///
/// The task follows the display channel: it arms an interval when the
/// stopwatch starts, re-arms it when a new run begins, and drops it when the
/// stopwatch stops or is torn down. Only one interval exists at a time.
async fn ticker_task(state: Arc<AppState>) {
    info!("Starting stopwatch ticker task");

    let mut display_rx = state.subscribe();

    loop {
        if state.is_torn_down() {
            break;
        }

        let running_epoch = {
            let snapshot = display_rx.borrow_and_update();
            snapshot.running.then_some(snapshot.epoch)
        };

        let Some(mut epoch) = running_epoch else {
            // Stopped, wait for the next state change
            if display_rx.changed().await.is_err() {
                warn!("Display channel closed, ticker exiting");
                break;
            }
            continue;
        };

        info!("Stopwatch running, ticker armed for run {}", epoch);
        let mut interval = tick_interval();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.apply_tick(epoch) {
                        Ok(Some(snapshot)) => {
                            debug!("Tick: {}", snapshot.display);
                        }
                        Ok(None) => {
                            debug!("Tick for run {} discarded, disarming", epoch);
                            break;
                        }
                        Err(e) => {
                            // A poisoned lock never recovers
                            error!("Failed to apply tick: {}, ticker exiting", e);
                            return;
                        }
                    }
                }

                changed = display_rx.changed() => {
                    if changed.is_err() {
                        warn!("Display channel closed, ticker exiting");
                        return;
                    }

                    let (running, latest_epoch) = {
                        let snapshot = display_rx.borrow_and_update();
                        (snapshot.running, snapshot.epoch)
                    };

                    if !running {
                        info!("Stopwatch stopped, cancelling ticker for run {}", epoch);
                        break;
                    }

                    if latest_epoch != epoch {
                        debug!("Run {} replaced by run {}, re-arming ticker", epoch, latest_epoch);
                        epoch = latest_epoch;
                        interval = tick_interval();
                    }
                }
            }
        }
    }

    info!("Stopwatch ticker task finished");
}

/// Owns the spawned ticker task. Dropping the handle aborts the task, so the
/// timer is released on every exit path.
#[derive(Debug)]
pub struct TickerHandle {
    state: Arc<AppState>,
    handle: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Tear the stopwatch down and wait for the ticker to finish
    pub async fn shutdown(mut self) -> Result<(), String> {
        self.state.teardown()?;

        if let Some(handle) = self.handle.take() {
            handle.await
                .map_err(|e| format!("Ticker task failed: {}", e))?;
        }

        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Spawn the ticker task for `state`
pub fn spawn_ticker(state: Arc<AppState>) -> TickerHandle {
    let task_state = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        ticker_task(task_state).await;
    });

    TickerHandle {
        state,
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Phase, TimeState};
    use tokio::time::sleep;

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::new(0, "127.0.0.1".to_string()))
    }

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[tokio::test(start_paused = true)]
    async fn sixty_one_seconds_of_ticks() {
        let state = app_state();
        let _ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(61_500)).await;

        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.time(), TimeState { hours: 0, minutes: 1, seconds: 1 });
        assert_eq!(snapshot.display, "00:01:01");
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_a_full_period() {
        let state = app_state();
        let _ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(999)).await;
        assert!(state.get_snapshot().unwrap().time().is_zero());

        sleep(millis(2)).await;
        assert_eq!(state.get_snapshot().unwrap().seconds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_drift_while_stopped() {
        let state = app_state();
        let _ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(3_500)).await;
        state.stop().unwrap();

        sleep(millis(60_000)).await;
        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Stopped);
        assert_eq!(snapshot.seconds, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_continues_from_stored_time() {
        let state = app_state();
        let _ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(3_500)).await;
        state.stop().unwrap();
        sleep(millis(5_000)).await;

        state.start().unwrap();
        sleep(millis(2_500)).await;
        assert_eq!(state.get_snapshot().unwrap().seconds, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_rearms_single_interval() {
        let state = app_state();
        let _ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(1_500)).await;

        // The old run would fire at 2.0s; the new one first fires at 2.5s
        state.stop().unwrap();
        state.start().unwrap();
        sleep(millis(700)).await;
        assert_eq!(state.get_snapshot().unwrap().seconds, 1);

        sleep(millis(400)).await;
        assert_eq!(state.get_snapshot().unwrap().seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_while_running_stops_at_zero() {
        let state = app_state();
        let _ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(4_200)).await;
        let snapshot = state.reset().unwrap();
        assert_eq!(snapshot.phase, Phase::Stopped);

        sleep(millis(10_000)).await;
        assert!(state.get_snapshot().unwrap().time().is_zero());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_ticking() {
        let state = app_state();
        let ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(2_500)).await;
        ticker.shutdown().await.unwrap();

        sleep(millis(10_000)).await;
        let snapshot = state.get_snapshot().unwrap();
        assert!(!snapshot.running);
        assert_eq!(snapshot.seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_aborts_task() {
        let state = app_state();
        let ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(1_500)).await;
        drop(ticker);

        sleep(millis(5_000)).await;
        assert_eq!(state.get_snapshot().unwrap().seconds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poisoned_state_stops_ticker() {
        let state = app_state();
        let ticker = spawn_ticker(Arc::clone(&state));

        state.start().unwrap();
        sleep(millis(500)).await;
        assert!(!ticker.is_finished());

        let poisoner = Arc::clone(&state);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.stopwatch.lock().unwrap();
            panic!("poisoning stopwatch lock");
        })
        .join();
        assert!(result.is_err());

        sleep(millis(1_000)).await;
        assert!(ticker.is_finished());
    }
}
