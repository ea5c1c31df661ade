//! Presentation module
//!
//! Formats elapsed time for display and renders the stopwatch page.

pub mod format;
pub mod page;

// Re-export main functions
pub use format::{format_display, format_time};
pub use page::render_page;
