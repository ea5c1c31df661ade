//! Elapsed time structure and carry arithmetic

use serde::{Deserialize, Serialize};

/// Elapsed time at one-second resolution
///
/// `minutes` and `seconds` always stay in `0..=59`; `hours` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeState {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeState {
    /// The zeroed time every stopwatch starts from
    pub const ZERO: TimeState = TimeState {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Create a new zeroed time state
    pub fn new() -> Self {
        Self::ZERO
    }

    /// Build a time state from a total number of elapsed seconds
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: ((total % 3600) / 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    /// Total elapsed seconds represented by this state
    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// Check that minutes and seconds are within `0..=59`
    pub fn is_valid(&self) -> bool {
        self.minutes <= 59 && self.seconds <= 59
    }

    /// Compute the time one second later, carrying seconds into minutes
    /// and minutes into hours
    pub fn tick(self) -> Self {
        debug_assert!(self.is_valid(), "time state out of range: {:?}", self);

        if self.seconds == 59 {
            if self.minutes == 59 {
                return Self {
                    hours: self.hours + 1,
                    minutes: 0,
                    seconds: 0,
                };
            }
            return Self {
                hours: self.hours,
                minutes: self.minutes + 1,
                seconds: 0,
            };
        }

        Self {
            seconds: self.seconds + 1,
            ..self
        }
    }

    /// Whether no time has elapsed
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}
