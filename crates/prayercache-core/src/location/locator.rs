use std::future::Future;

use crate::config::Config;
use crate::models::Position;

use super::{IpLocator, LocationError};

/// Something that can tell where the user is.
pub trait Locator {
    fn locate(&self) -> impl Future<Output = Result<Position, LocationError>> + Send;
}

/// Always reports the same, configured position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Position);

impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Position, LocationError> {
        Ok(self.0)
    }
}

/// Location lookups are turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocator;

impl Locator for DisabledLocator {
    async fn locate(&self) -> Result<Position, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// The locator chosen by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredLocator {
    Fixed(FixedLocator),
    Ip(IpLocator),
    Disabled(DisabledLocator),
}

impl ConfiguredLocator {
    /// Fixed coordinates win; otherwise IP lookup if allowed; otherwise disabled.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        if let Some(position) = config.position() {
            return Ok(Self::Fixed(FixedLocator(position)));
        }
        if config.ip_lookup {
            return Ok(Self::Ip(IpLocator::new(
                &config.ip_lookup_url(),
                config.location_timeout(),
            )?));
        }
        Ok(Self::Disabled(DisabledLocator))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "configured coordinates",
            Self::Ip(_) => "IP lookup",
            Self::Disabled(_) => "disabled",
        }
    }
}

impl Locator for ConfiguredLocator {
    async fn locate(&self) -> Result<Position, LocationError> {
        match self {
            Self::Fixed(l) => l.locate().await,
            Self::Ip(l) => l.locate().await,
            Self::Disabled(l) => l.locate().await,
        }
    }
}
