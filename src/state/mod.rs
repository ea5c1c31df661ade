//! State management module
//!
//! This module contains the stopwatch state structures and their management logic.

pub mod time_state;
pub mod stopwatch_state;
pub mod app_state;

// Re-export main types
pub use time_state::TimeState;
pub use stopwatch_state::{Phase, StopwatchSnapshot, StopwatchState};
pub use app_state::AppState;
