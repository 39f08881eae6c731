//! Data models for prayer calendar data.
//!
//! This module contains the data structures used to represent
//! calendar responses and the cached monthly payload:
//!
//! - `DayTimings`, `Timings`, `DateInfo`: one day of the Aladhan calendar
//! - `CalendarResponse`: the API envelope around a month of days
//! - `MonthlyTimings`: the single persisted cache entry
//! - `Position`: a latitude/longitude pair

pub mod calendar;

pub use calendar::{
    CalendarResponse, DateInfo, DayTimings, GregorianDate, MonthlyTimings, Position, Prayer,
    Timings,
};
