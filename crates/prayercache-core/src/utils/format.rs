use chrono::{DateTime, NaiveDate, TimeZone};

use crate::models::Position;

/// Placeholder shown when a time is missing or unreadable
pub const MISSING_TIME: &str = "--:--";

/// Format a 24-hour "HH:MM" time as 12-hour "H:MM AM/PM".
/// Trailing text after the minutes (the API appends a zone, "05:12 (EEST)") is ignored.
pub fn format_time(time_24hr: &str) -> String {
    parse_hours_minutes(time_24hr)
        .map(|(h, m)| {
            let ampm = if h >= 12 { "PM" } else { "AM" };
            let h12 = if h % 12 == 0 { 12 } else { h % 12 };
            format!("{}:{:02} {}", h12, m, ampm)
        })
        .unwrap_or_else(|| MISSING_TIME.to_string())
}

fn parse_hours_minutes(time: &str) -> Option<(u32, u32)> {
    let (hours, rest) = time.trim().split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;

    let minute_digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let minutes: u32 = minute_digits.parse().ok()?;

    if hours > 23 || minutes > 59 {
        return None;
    }
    Some((hours, minutes))
}

/// Format a date for the heading, e.g. "Saturday, October 17, 2026"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Format a wall-clock time, e.g. "8:03:11 PM"
pub fn format_clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-I:%M:%S %p").to_string()
}

/// Format a timestamp as date plus clock, e.g. "10/15/2026 8:03:11 PM"
pub fn format_short_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y %-I:%M:%S %p").to_string()
}

/// Format a position for the location line, e.g. "Lat 41.01, Lon 28.98"
pub fn format_coords(position: &Position) -> String {
    format!(
        "Lat {:.2}, Lon {:.2}",
        position.latitude, position.longitude
    )
}

/// Number of rows `s` takes when word-wrapped to `width` columns.
/// Words longer than a row are split across rows.
pub fn wrapped_line_count(s: &str, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    let mut lines = 1;
    let mut current = 0;
    for word in s.split_whitespace() {
        let len = word.chars().count();
        if current == 0 {
            current = len;
        } else if current + 1 + len <= width {
            current += 1 + len;
        } else {
            lines += 1;
            current = len;
        }
        while current > width {
            lines += 1;
            current -= width;
        }
    }
    lines
}
