//! API client for the Aladhan calendar endpoint.
//!
//! `GET /v1/calendar` returns every day of one month for a position and
//! calculation method. The prayer time client fetches a whole month at a
//! time so that the cache can serve the remaining days offline.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{CalendarResponse, DayTimings, Position};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the public Aladhan API
pub const DEFAULT_API_BASE_URL: &str = "https://api.aladhan.com";

/// Path of the monthly calendar endpoint
const CALENDAR_PATH: &str = "/v1/calendar";

/// Islamic Society of North America, the calculation method the API is queried with by default
pub const DEFAULT_METHOD: u8 = 2;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Parameters of one monthly calendar request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarQuery {
    pub position: Position,
    pub method: u8,
    pub month: u32,
    pub year: i32,
}

/// Anything that can produce a month of prayer timings.
pub trait CalendarSource {
    fn fetch_month(
        &self,
        query: &CalendarQuery,
    ) -> impl Future<Output = Result<Vec<DayTimings>>> + Send;
}

/// API client for api.aladhan.com.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the public API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }

    /// Create a new API client against another deployment of the same API
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn calendar_url(&self, query: &CalendarQuery) -> Result<Url> {
        let base = format!("{}{}", self.base_url, CALENDAR_PATH);
        let url = Url::parse_with_params(
            &base,
            &[
                ("latitude", query.position.latitude.to_string()),
                ("longitude", query.position.longitude.to_string()),
                ("method", query.method.to_string()),
                ("month", query.month.to_string()),
                ("year", query.year.to_string()),
            ],
        )
        .with_context(|| format!("Invalid calendar URL: {}", base))?;
        Ok(url)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        warn!(%status, error = %error, "Calendar request failed");
        Err(error)
    }

    /// Send one request. Rate limiting is reported, never retried.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let text = Self::check_response(response).await?.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed calendar payload: {}", e)))
    }

    /// Fetch every day of one month for a position
    pub async fn fetch_calendar(&self, query: &CalendarQuery) -> Result<Vec<DayTimings>> {
        let url = self.calendar_url(query)?;
        debug!(%url, "Fetching prayer calendar");

        let response: CalendarResponse = self.get(url).await?;
        let days = response.data.ok_or(ApiError::MissingData)?;

        debug!(
            days = days.len(),
            status = ?response.status,
            "Prayer calendar received"
        );
        Ok(days)
    }
}

impl CalendarSource for ApiClient {
    async fn fetch_month(&self, query: &CalendarQuery) -> Result<Vec<DayTimings>> {
        self.fetch_calendar(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn query() -> CalendarQuery {
        CalendarQuery {
            position: Position::new(41.0082, 28.9784),
            method: DEFAULT_METHOD,
            month: 10,
            year: 2026,
        }
    }

    #[test]
    fn test_calendar_url() {
        let client = ApiClient::new().expect("client builds");
        let url = client.calendar_url(&query()).expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://api.aladhan.com/v1/calendar?latitude=41.0082&longitude=28.9784&method=2&month=10&year=2026"
        );
    }

    #[test]
    fn test_calendar_url_with_custom_base() {
        let client = ApiClient::with_base_url("http://localhost:8080/").expect("client builds");
        let url = client.calendar_url(&query()).expect("valid url");
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.path(), "/v1/calendar");
    }

    #[test]
    fn test_invalid_base_url_is_an_error() {
        let client = ApiClient::with_base_url("not a url").expect("client builds");
        assert!(client.calendar_url(&query()).is_err());
    }

    /// Local HTTP server that answers every connection with the same response
    /// and counts how many requests it saw.
    struct CannedServer {
        base_url: String,
        hits: Arc<AtomicUsize>,
    }

    impl CannedServer {
        fn start(status: &'static str, body: &'static str) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = hits.clone();

            // Detached; the listener lives until the test process exits
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { continue };
                    let mut buf = [0_u8; 4096];
                    let _ = stream.set_read_timeout(Some(Duration::from_millis(500)));
                    let _ = stream.read(&mut buf);
                    counter.fetch_add(1, Ordering::SeqCst);

                    let resp = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(resp.as_bytes());
                    let _ = stream.flush();
                }
            });

            Self { base_url, hits }
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        async fn fetch(&self) -> anyhow::Error {
            let client = ApiClient::with_base_url(&self.base_url).unwrap();
            client
                .fetch_calendar(&query())
                .await
                .expect_err("request should fail")
        }
    }

    fn api_error(err: &anyhow::Error) -> &ApiError {
        err.downcast_ref::<ApiError>()
            .unwrap_or_else(|| panic!("not an ApiError: {err:#}"))
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let server = CannedServer::start("429 Too Many Requests", "slow down");
        let started = std::time::Instant::now();

        let err = server.fetch().await;

        assert!(matches!(api_error(&err), ApiError::RateLimited));
        assert_eq!(server.hits(), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = CannedServer::start("500 Internal Server Error", "database down");
        let err = server.fetch().await;
        match api_error(&err) {
            ApiError::ServerError(msg) => assert!(msg.contains("database down")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let server = CannedServer::start("200 OK", "<html>maintenance</html>");
        let err = server.fetch().await;
        match api_error(&err) {
            ApiError::InvalidResponse(msg) => {
                assert!(msg.starts_with("Malformed calendar payload"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_data_is_missing_data() {
        let server = CannedServer::start("200 OK", r#"{"code":200,"status":"OK","data":null}"#);
        let err = server.fetch().await;
        assert!(matches!(api_error(&err), ApiError::MissingData));
    }

    #[tokio::test]
    async fn test_calendar_days_are_returned() {
        let server = CannedServer::start(
            "200 OK",
            r#"{"code":200,"status":"OK","data":[{"timings":{"Fajr":"05:12 (+03)","Isha":"20:01 (+03)"},"date":{"readable":"17 Oct 2026"}}]}"#,
        );
        let client = ApiClient::with_base_url(&server.base_url).unwrap();

        let days = client.fetch_calendar(&query()).await.unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date.readable, "17 Oct 2026");
        assert_eq!(server.hits(), 1);
    }
}
