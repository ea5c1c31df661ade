//! Time formatting

use crate::state::TimeState;

/// Format one time component, padding values below ten with a single `0`.
///
/// Values of 100 and above are returned unpadded at their natural width.
pub fn format_time(value: u64) -> String {
    if value < 10 {
        format!("0{}", value)
    } else {
        value.to_string()
    }
}

/// Format a time state as `HH:MM:SS`
pub fn format_display(time: &TimeState) -> String {
    format!(
        "{}:{}:{}",
        format_time(time.hours),
        format_time(u64::from(time.minutes)),
        format_time(u64::from(time.seconds)),
    )
}
