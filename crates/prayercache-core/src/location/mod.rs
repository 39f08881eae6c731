//! Locating the user.
//!
//! A terminal has no geolocation prompt, so a position comes from one of:
//!
//! - `FixedLocator`: coordinates from configuration or the environment
//! - `IpLocator`: an IP geolocation lookup over HTTP, bounded by a timeout
//!   and reusing a recent fix
//! - `DisabledLocator`: lookups turned off, which behaves like a denied
//!   permission
//!
//! `ConfiguredLocator` picks one of these from a `Config`.

pub mod error;
pub mod ip;
pub mod locator;

pub use error::LocationError;
pub use ip::IpLocator;
pub use locator::{ConfiguredLocator, DisabledLocator, FixedLocator, Locator};
