//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager` for storing and retrieving the
//! single monthly prayer-time entry. The entry is written in JSON format,
//! replaced wholesale on every successful fetch, and considered stale after
//! seven days or once the calendar month changes.

pub mod manager;

pub use manager::CacheManager;
