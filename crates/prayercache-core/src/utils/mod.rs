//! Utility functions for time, date and string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    format_clock, format_coords, format_long_date, format_short_datetime, format_time,
    wrapped_line_count,
};
