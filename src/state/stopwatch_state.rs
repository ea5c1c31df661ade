//! Stopwatch state structure and control transitions

use serde::{Deserialize, Serialize};

use super::TimeState;
use crate::view::format_display;

/// The two states of the stopwatch state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Stopped,
    Running,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Stopped => "stopped",
            Phase::Running => "running",
        }
    }
}

/// Stopwatch state - elapsed time plus the running flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwatchState {
    /// Elapsed time, advanced only by ticks and cleared only by reset
    pub time: TimeState,
    /// Whether ticks are currently being scheduled
    pub running: bool,
    /// Incremented on every Stopped -> Running transition so that ticks
    /// scheduled by an earlier run are never applied to a later one
    pub epoch: u64,
}

impl StopwatchState {
    /// Create a new stopped stopwatch at `00:00:00`
    pub fn new() -> Self {
        Self {
            time: TimeState::ZERO,
            running: false,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.running {
            Phase::Running
        } else {
            Phase::Stopped
        }
    }

    /// Start the stopwatch. Returns true if the phase changed.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.epoch += 1;
        true
    }

    /// Stop the stopwatch, keeping the elapsed time. Returns true if the
    /// phase changed.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Stop the stopwatch and clear the elapsed time
    pub fn reset(&mut self) {
        self.running = false;
        self.time = TimeState::ZERO;
    }

    /// Apply one tick scheduled under `epoch`.
    ///
    /// Ticks from a stale run, or delivered while stopped, are dropped and
    /// `None` is returned.
    pub fn apply_tick(&mut self, epoch: u64) -> Option<TimeState> {
        if !self.running || self.epoch != epoch {
            return None;
        }
        self.time = self.time.tick();
        debug_assert!(self.time.is_valid());
        Some(self.time)
    }

    /// Take a serializable snapshot for display
    pub fn snapshot(&self) -> StopwatchSnapshot {
        StopwatchSnapshot {
            phase: self.phase(),
            running: self.running,
            hours: self.time.hours,
            minutes: self.time.minutes,
            seconds: self.time.seconds,
            display: format_display(&self.time),
            epoch: self.epoch,
        }
    }
}

impl Default for StopwatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the stopwatch published to display subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchSnapshot {
    pub phase: Phase,
    pub running: bool,
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub display: String,
    pub epoch: u64,
}

impl StopwatchSnapshot {
    pub fn time(&self) -> TimeState {
        TimeState {
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
        }
    }
}
