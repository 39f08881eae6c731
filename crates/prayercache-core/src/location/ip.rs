use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::Position;

use super::{LocationError, Locator};

/// Default IP geolocation endpoint
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

/// How long to wait for a position before giving up
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// A fix younger than this is reused instead of asking again
pub const MAX_FIX_AGE: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl IpLookupResponse {
    fn into_position(self) -> Result<Position, LocationError> {
        if self.error {
            let reason = self.reason.unwrap_or_else(|| "lookup refused".to_string());
            return Err(LocationError::Unavailable(reason));
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok(Position::new(lat, lon)),
            _ => Err(LocationError::Unavailable(
                "no coordinates in lookup response".to_string(),
            )),
        }
    }
}

/// Locates the user from their public IP address.
/// Clones share the last fix.
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
    timeout: Duration,
    last_fix: Arc<Mutex<Option<(Position, Instant)>>>,
}

impl IpLocator {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for IP lookup")?;

        Ok(Self {
            client,
            url: url.to_string(),
            timeout,
            last_fix: Arc::new(Mutex::new(None)),
        })
    }

    fn recent_fix(&self) -> Option<Position> {
        let guard = self.last_fix.lock().unwrap_or_else(|p| p.into_inner());
        (*guard)
            .filter(|(_, at)| at.elapsed() < MAX_FIX_AGE)
            .map(|(position, _)| position)
    }

    fn remember(&self, position: Position, at: Instant) {
        let mut guard = self.last_fix.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some((position, at));
    }

    async fn lookup(&self) -> Result<Position, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "lookup returned {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        body.into_position()
    }
}

/// Run a position request, mapping an elapsed deadline to `LocationError::Timeout`.
pub async fn within<F>(timeout: Duration, request: F) -> Result<Position, LocationError>
where
    F: Future<Output = Result<Position, LocationError>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}

impl Locator for IpLocator {
    async fn locate(&self) -> Result<Position, LocationError> {
        if let Some(position) = self.recent_fix() {
            debug!("Reusing recent location fix");
            return Ok(position);
        }

        debug!(url = %self.url, "Getting your location...");
        match within(self.timeout, self.lookup()).await {
            Ok(position) => {
                self.remember(position, Instant::now());
                Ok(position)
            }
            Err(e) => {
                warn!(error = %e, "IP location lookup failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so lookups fail fast
    const UNREACHABLE_URL: &str = "http://127.0.0.1:9/json/";

    #[test]
    fn test_lookup_response_parsing() {
        let ok: IpLookupResponse =
            serde_json::from_str(r#"{"ip":"1.2.3.4","city":"Istanbul","latitude":41.01,"longitude":28.97}"#)
                .unwrap();
        assert_eq!(ok.into_position(), Ok(Position::new(41.01, 28.97)));

        let refused: IpLookupResponse =
            serde_json::from_str(r#"{"error":true,"reason":"RateLimited"}"#).unwrap();
        assert_eq!(
            refused.into_position(),
            Err(LocationError::Unavailable("RateLimited".to_string()))
        );

        let partial: IpLookupResponse = serde_json::from_str(r#"{"latitude":41.01}"#).unwrap();
        assert!(matches!(
            partial.into_position(),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_recent_fix_is_reused() {
        let locator = IpLocator::new(UNREACHABLE_URL, Duration::from_secs(2)).unwrap();
        locator.remember(Position::new(1.0, 2.0), Instant::now());

        // Never touches the network
        assert_eq!(locator.locate().await, Ok(Position::new(1.0, 2.0)));

        // Clones share the fix
        let clone = locator.clone();
        assert_eq!(clone.locate().await, Ok(Position::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_old_fix_is_not_reused() {
        let locator = IpLocator::new(UNREACHABLE_URL, Duration::from_secs(2)).unwrap();
        if let Some(old) = Instant::now().checked_sub(MAX_FIX_AGE + Duration::from_secs(1)) {
            locator.remember(Position::new(1.0, 2.0), old);
            assert!(locator.recent_fix().is_none());
            assert!(locator.locate().await.is_err());
        }
    }

    #[tokio::test]
    async fn test_deadline_maps_to_timeout() {
        let result = within(
            Duration::from_millis(10),
            std::future::pending::<Result<Position, LocationError>>(),
        )
        .await;
        assert_eq!(result, Err(LocationError::Timeout));
    }

    #[tokio::test]
    async fn test_request_inside_deadline_passes_through() {
        let result = within(Duration::from_secs(1), async {
            Ok(Position::new(3.0, 4.0))
        })
        .await;
        assert_eq!(result, Ok(Position::new(3.0, 4.0)));
    }
}
