//! Background tasks module
//!
//! This module contains the timer task that runs alongside the HTTP server.

pub mod ticker;

// Re-export main functions
pub use ticker::{spawn_ticker, TickerHandle};
