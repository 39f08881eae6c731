//! The prayer time client: decides between cache and network for today's times.
//!
//! A load either renders from a fresh cached month, or locates the user,
//! fetches the current month and overwrites the cache. Every failure is
//! reported as a `Notice` and recovered by falling back to whatever cached
//! entry still covers today.

pub mod client;
pub mod report;

pub use client::{PrayerTimeClient, RefreshError};
pub use report::{FormattedTimings, LoadReport, LocationStatus, Notice, Provenance, TodayView};
