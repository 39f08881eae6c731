use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::models::{DayTimings, Position, Prayer, Timings};
use crate::utils::{format_clock, format_coords, format_long_date, format_short_datetime, format_time};

/// Where the displayed times came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Fetched by this load.
    Fresh { updated_at: DateTime<Utc> },
    /// Read back from the cache entry fetched at `fetched_at`.
    Cached { fetched_at: DateTime<Utc> },
}

impl Provenance {
    pub fn is_cached(&self) -> bool {
        matches!(self, Provenance::Cached { .. })
    }

    pub fn last_updated_line(&self) -> String {
        match self {
            Provenance::Fresh { updated_at } => {
                format!("Last updated: {}", format_clock(&updated_at.with_timezone(&Local)))
            }
            Provenance::Cached { fetched_at } => format!(
                "(from cache, last fetched: {})",
                format_short_datetime(&fetched_at.with_timezone(&Local))
            ),
        }
    }
}

/// The six display times, already formatted as 12-hour strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedTimings {
    entries: Vec<(Prayer, String)>,
}

impl FormattedTimings {
    pub fn from_timings(timings: &Timings) -> Self {
        let entries = Prayer::ALL
            .iter()
            .map(|&prayer| (prayer, format_time(timings.get(prayer).unwrap_or(""))))
            .collect();
        Self { entries }
    }

    pub fn get(&self, prayer: Prayer) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == prayer)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prayer, &str)> {
        self.entries.iter().map(|(p, t)| (*p, t.as_str()))
    }
}

/// Today's times, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayView {
    pub date: NaiveDate,
    pub times: FormattedTimings,
    pub provenance: Provenance,
}

impl TodayView {
    /// Build from a day record; `None` when the record has no timings or no readable date.
    pub fn from_day(day: &DayTimings, provenance: Provenance) -> Option<Self> {
        let timings = day.timings.as_ref()?;
        Some(Self {
            date: day.date()?,
            times: FormattedTimings::from_timings(timings),
            provenance,
        })
    }

    pub fn date_line(&self) -> String {
        format_long_date(self.date)
    }
}

/// What the location line shows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationStatus {
    #[default]
    Unknown,
    Known(Position),
    Unavailable,
}

impl LocationStatus {
    pub fn display(&self) -> String {
        match self {
            LocationStatus::Unknown => "Location: --".to_string(),
            LocationStatus::Known(position) => format!("Location: {}", format_coords(position)),
            LocationStatus::Unavailable => "Location unavailable.".to_string(),
        }
    }
}

/// A transient, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn storage_failed() -> Self {
        Self::new("Could not save prayer times for offline use. Storage might be full.")
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of one load: what to render plus the notices raised on the way.
/// No `view` is the error state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub view: Option<TodayView>,
    pub location: LocationStatus,
    pub notices: Vec<Notice>,
}

impl LoadReport {
    pub fn is_error_state(&self) -> bool {
        self.view.is_none()
    }

    pub fn from_cache(&self) -> bool {
        self.view
            .as_ref()
            .map(|v| v.provenance.is_cached())
            .unwrap_or(false)
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
