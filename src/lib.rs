//! Stopwatch - A state-managed HTTP server hosting a browser stopwatch
//!
//! This library provides the stopwatch state machine, the ticker task that
//! advances it once per second, and the HTTP surface that renders it.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, StopwatchSnapshot, TimeState};
pub use api::create_router;
pub use tasks::spawn_ticker;
pub use utils::signals::shutdown_signal;
