use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Consider a cached month stale after a week.
/// Calculated times drift little within a month, so a week-old fetch is still usable.
pub const CACHE_STALE_DAYS: i64 = 7;

/// Format of `date.readable` in calendar responses, e.g. "01 Oct 2026".
const READABLE_DATE_FORMAT: &str = "%d %b %Y";

/// Format of `date.gregorian.date` in calendar responses, e.g. "01-10-2026".
const GREGORIAN_DATE_FORMAT: &str = "%d-%m-%Y";

/// The named times shown to the user, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Raw prayer-time strings for one day, as returned by the API ("05:12 (EEST)").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(rename = "Fajr", default)]
    pub fajr: Option<String>,
    #[serde(rename = "Sunrise", default)]
    pub sunrise: Option<String>,
    #[serde(rename = "Dhuhr", default)]
    pub dhuhr: Option<String>,
    #[serde(rename = "Asr", default)]
    pub asr: Option<String>,
    #[serde(rename = "Maghrib", default)]
    pub maghrib: Option<String>,
    #[serde(rename = "Isha", default)]
    pub isha: Option<String>,
    #[serde(rename = "Imsak", default, skip_serializing_if = "Option::is_none")]
    pub imsak: Option<String>,
    #[serde(rename = "Midnight", default, skip_serializing_if = "Option::is_none")]
    pub midnight: Option<String>,
}

impl Timings {
    pub fn get(&self, prayer: Prayer) -> Option<&str> {
        let value = match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Sunrise => &self.sunrise,
            Prayer::Dhuhr => &self.dhuhr,
            Prayer::Asr => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
        };
        value.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GregorianDate {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateInfo {
    pub readable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gregorian: Option<GregorianDate>,
}

impl DateInfo {
    /// Parse the calendar date of this record.
    /// Uses the readable form first, then the numeric gregorian form.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.readable.trim(), READABLE_DATE_FORMAT)
            .ok()
            .or_else(|| {
                self.gregorian.as_ref().and_then(|g| {
                    NaiveDate::parse_from_str(g.date.trim(), GREGORIAN_DATE_FORMAT).ok()
                })
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTimings {
    // A day without timings is kept so the month stays intact, but it never matches
    #[serde(default)]
    pub timings: Option<Timings>,
    pub date: DateInfo,
}

impl DayTimings {
    pub fn date(&self) -> Option<NaiveDate> {
        self.date.to_naive_date()
    }
}

/// Envelope of `GET /v1/calendar`.
#[derive(Debug, Deserialize)]
pub struct CalendarResponse {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    // Absent or null when the API rejects the request with a 200
    #[serde(default)]
    pub data: Option<Vec<DayTimings>>,
}

/// The single persisted cache entry: one month of timings for one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTimings {
    pub timings: Vec<DayTimings>,
    pub latitude: f64,
    pub longitude: f64,
    pub month: u32,
    pub year: i32,
    pub fetched_at: DateTime<Utc>,
}

impl MonthlyTimings {
    pub fn new(
        timings: Vec<DayTimings>,
        position: Position,
        month: u32,
        year: i32,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            timings,
            latitude: position.latitude,
            longitude: position.longitude,
            month,
            year,
            fetched_at,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }

    /// Whether this entry covers the month containing `today`.
    pub fn is_for_month_of(&self, today: NaiveDate) -> bool {
        self.month == today.month() && self.year == today.year()
    }

    /// Fresh means same calendar month as `today` and fetched less than a week before `now`.
    pub fn is_fresh(&self, today: NaiveDate, now: DateTime<Utc>) -> bool {
        self.is_for_month_of(today) && self.fetched_at > now - Duration::days(CACHE_STALE_DAYS)
    }

    /// Find the record for `day` that carries timings.
    pub fn day(&self, day: NaiveDate) -> Option<&DayTimings> {
        find_day(&self.timings, day)
    }

    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.fetched_at).num_minutes()
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let minutes = self.age_minutes(now);
        if minutes < 1 {
            // Clock skew lands here too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Linear scan for the record dated `day`. Records without timings are skipped.
pub fn find_day(days: &[DayTimings], day: NaiveDate) -> Option<&DayTimings> {
    days.iter()
        .find(|d| d.timings.is_some() && d.date() == Some(day))
}
