//! REST API client module for the Aladhan prayer calendar.
//!
//! This module provides the `ApiClient` for fetching a month of prayer
//! times for a position, and the `CalendarSource` trait the prayer time
//! client depends on so that it can run against an in-memory source.

pub mod client;
pub mod error;

pub use client::{ApiClient, CalendarQuery, CalendarSource};
pub use error::ApiError;
