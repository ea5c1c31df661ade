//! Main application state management

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{StopwatchSnapshot, StopwatchState};

/// Main application state that owns the stopwatch and publishes its changes
#[derive(Debug)]
pub struct AppState {
    /// Elapsed time, running flag and run epoch
    pub stopwatch: Arc<Mutex<StopwatchState>>,
    /// Set once by `teardown`, always while holding the stopwatch lock
    torn_down: AtomicBool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Optional stylesheet served alongside the page
    pub stylesheet: Option<PathBuf>,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Display refresh channel, updated after every mutation
    pub display_tx: watch::Sender<StopwatchSnapshot>,
}

impl AppState {
    /// Create a new AppState with a stopped stopwatch at zero
    pub fn new(port: u16, host: String) -> Self {
        let stopwatch = StopwatchState::new();
        let (display_tx, _) = watch::channel(stopwatch.snapshot());

        Self {
            stopwatch: Arc::new(Mutex::new(stopwatch)),
            torn_down: AtomicBool::new(false),
            start_time: Instant::now(),
            port,
            host,
            stylesheet: None,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            display_tx,
        }
    }

    /// Serve the stylesheet at `path` with the page
    pub fn with_stylesheet(mut self, path: Option<PathBuf>) -> Self {
        self.stylesheet = path;
        self
    }

    /// Apply a control action to the stopwatch and notify display subscribers
    pub fn update_state<F>(&self, action: &str, updater: F) -> Result<StopwatchSnapshot, String>
    where
        F: FnOnce(&mut StopwatchState),
    {
        let mut stopwatch = self.stopwatch.lock()
            .map_err(|e| format!("Failed to lock stopwatch state: {}", e))?;

        if self.is_torn_down() {
            return Err(format!("Cannot {}: stopwatch has been torn down", action));
        }

        updater(&mut *stopwatch);
        let snapshot = stopwatch.snapshot();
        // Publish before releasing the lock so subscribers see mutations in order
        self.display_tx.send_replace(snapshot.clone());
        drop(stopwatch);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    /// Start the stopwatch
    pub fn start(&self) -> Result<StopwatchSnapshot, String> {
        info!("Starting stopwatch");
        self.update_state("start", |stopwatch| {
            if !stopwatch.start() {
                debug!("Stopwatch already running");
            }
        })
    }

    /// Stop the stopwatch, keeping the elapsed time
    pub fn stop(&self) -> Result<StopwatchSnapshot, String> {
        info!("Stopping stopwatch");
        self.update_state("stop", |stopwatch| {
            if !stopwatch.stop() {
                debug!("Stopwatch already stopped");
            }
        })
    }

    /// Stop the stopwatch and clear the elapsed time
    pub fn reset(&self) -> Result<StopwatchSnapshot, String> {
        info!("Resetting stopwatch");
        self.update_state("reset", StopwatchState::reset)
    }

    /// Apply one timer tick scheduled under `epoch`.
    ///
    /// Returns the new snapshot, or `None` when the tick arrived after a
    /// stop, a reset, a restart or teardown and was discarded.
    pub fn apply_tick(&self, epoch: u64) -> Result<Option<StopwatchSnapshot>, String> {
        let mut stopwatch = self.stopwatch.lock()
            .map_err(|e| format!("Failed to lock stopwatch state: {}", e))?;

        if self.is_torn_down() || stopwatch.apply_tick(epoch).is_none() {
            debug!("Discarding tick for epoch {}", epoch);
            return Ok(None);
        }

        let snapshot = stopwatch.snapshot();
        self.display_tx.send_replace(snapshot.clone());
        Ok(Some(snapshot))
    }

    /// Get the current stopwatch snapshot
    pub fn get_snapshot(&self) -> Result<StopwatchSnapshot, String> {
        self.stopwatch.lock()
            .map(|stopwatch| stopwatch.snapshot())
            .map_err(|e| format!("Failed to lock stopwatch state: {}", e))
    }

    /// Subscribe to display refreshes
    pub fn subscribe(&self) -> watch::Receiver<StopwatchSnapshot> {
        self.display_tx.subscribe()
    }

    /// Stop the stopwatch for good. Ticks and control actions are refused
    /// afterwards.
    pub fn teardown(&self) -> Result<(), String> {
        let mut stopwatch = self.stopwatch.lock()
            .map_err(|e| format!("Failed to lock stopwatch state: {}", e))?;

        stopwatch.stop();
        self.torn_down.store(true, Ordering::SeqCst);
        self.display_tx.send_replace(stopwatch.snapshot());
        drop(stopwatch);

        info!("Stopwatch torn down");
        Ok(())
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Calculate server uptime as a formatted string
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Phase, TimeState};

    fn app_state() -> AppState {
        AppState::new(0, "127.0.0.1".to_string())
    }

    #[test]
    fn control_actions_publish_snapshots() {
        let state = app_state();
        let mut rx = state.subscribe();
        assert!(!rx.has_changed().unwrap());

        state.start().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase, Phase::Running);

        state.stop().unwrap();
        assert_eq!(rx.borrow_and_update().phase, Phase::Stopped);
    }

    #[test]
    fn ticks_apply_only_to_current_run() {
        let state = app_state();
        let epoch = state.start().unwrap().epoch;

        let snapshot = state.apply_tick(epoch).unwrap().unwrap();
        assert_eq!(snapshot.display, "00:00:01");

        state.stop().unwrap();
        assert_eq!(state.apply_tick(epoch).unwrap(), None);

        let next = state.start().unwrap().epoch;
        assert_eq!(state.apply_tick(epoch).unwrap(), None);
        assert!(state.apply_tick(next).unwrap().is_some());
        assert_eq!(state.get_snapshot().unwrap().time(), TimeState::from_total_seconds(2));
    }

    #[test]
    fn reset_records_last_action() {
        let state = app_state();
        let epoch = state.start().unwrap().epoch;
        state.apply_tick(epoch).unwrap();

        let snapshot = state.reset().unwrap();
        assert_eq!(snapshot.phase, Phase::Stopped);
        assert_eq!(snapshot.display, "00:00:00");

        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("reset"));
        assert!(time.is_some());
    }

    #[test]
    fn teardown_refuses_ticks_and_actions() {
        let state = app_state();
        let epoch = state.start().unwrap().epoch;
        state.teardown().unwrap();

        assert!(state.is_torn_down());
        assert_eq!(state.apply_tick(epoch).unwrap(), None);
        assert!(state.start().is_err());
        assert!(!state.get_snapshot().unwrap().running);
    }
}
