use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, CalendarQuery, CalendarSource};
use crate::cache::CacheManager;
use crate::location::{LocationError, Locator};
use crate::models::{MonthlyTimings, Position};

use super::{LoadReport, LocationStatus, Notice, Provenance, TodayView};

/// Why a refresh produced no times for today.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("{0} Displaying cached data if available.")]
    Location(#[from] LocationError),

    #[error("Could not fetch new prayer times. Using cached data if available, or check internet.")]
    Fetch(String),

    #[error("No prayer times data received from API.")]
    MissingData,

    #[error("No prayer times found for today in the fetched data.")]
    NoDataForToday,
}

impl RefreshError {
    fn from_fetch(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ApiError>() {
            Some(ApiError::MissingData) => RefreshError::MissingData,
            _ => RefreshError::Fetch(format!("{:#}", err)),
        }
    }
}

/// Gets today's prayer times, preferring fresh data and degrading to the cache.
///
/// Only one location request and one network request are made per load, one
/// after the other. Clone is cheap; clones share the cache directory.
#[derive(Clone)]
pub struct PrayerTimeClient<S, L> {
    source: S,
    locator: L,
    cache: CacheManager,
    method: u8,
}

impl<S, L> PrayerTimeClient<S, L>
where
    S: CalendarSource + Sync,
    L: Locator + Sync,
{
    pub fn new(source: S, locator: L, cache: CacheManager, method: u8) -> Self {
        Self {
            source,
            locator,
            cache,
            method,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Load today's times by the local clock.
    /// `force_refresh` skips the fresh-cache shortcut and always goes to the network.
    pub async fn load(&self, force_refresh: bool) -> LoadReport {
        self.load_at(force_refresh, Local::now()).await
    }

    /// Load today's times as of `now`.
    pub async fn load_at(&self, force_refresh: bool, now: DateTime<Local>) -> LoadReport {
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);

        if !force_refresh {
            if let Some(report) = self.fresh_cache_report(today, now_utc) {
                return report;
            }
        }

        let mut report = LoadReport::default();
        match self.refresh(today, now_utc, &mut report).await {
            Ok(view) => {
                info!(date = %view.date, "Rendered fresh prayer times");
                report.view = Some(view);
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, falling back to cache");
                if let RefreshError::Fetch(ref detail) = e {
                    debug!(%detail, "Fetch failure detail");
                }
                let location_failed = matches!(e, RefreshError::Location(_));
                if location_failed {
                    report.location = LocationStatus::Unavailable;
                }
                report.notify(Notice::new(e.to_string()));
                self.fall_back_to_cache(today, location_failed, &mut report);
            }
        }
        report
    }

    /// The shortcut: a same-month entry younger than a week that has today in it.
    fn fresh_cache_report(&self, today: NaiveDate, now: DateTime<Utc>) -> Option<LoadReport> {
        let Some(cached) = self.cache.load_or_none() else {
            debug!("No cached data, fetching new");
            return None;
        };

        if !cached.is_fresh(today, now) {
            debug!(
                month = cached.month,
                year = cached.year,
                age = %cached.age_display(now),
                "Cached data is old or for different month/year, fetching new"
            );
            return None;
        }

        match Self::cached_view(&cached, today) {
            Some(view) => {
                debug!("Using cached data");
                Some(LoadReport {
                    view: Some(view),
                    location: LocationStatus::Known(cached.position()),
                    notices: Vec::new(),
                })
            }
            None => {
                debug!("Cached data for current month/year but no times for today, fetching new");
                None
            }
        }
    }

    async fn refresh(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
        report: &mut LoadReport,
    ) -> Result<TodayView, RefreshError> {
        let position = self.locator.locate().await?;
        report.location = LocationStatus::Known(position);

        let entry = self.fetch_month(position, today, now).await?;

        // The fetched month is still shown when it cannot be persisted
        if let Err(e) = self.cache.save(&entry) {
            error!(error = %e, "Error saving prayer times to cache");
            report.notify(Notice::storage_failed());
        }

        entry
            .day(today)
            .and_then(|day| TodayView::from_day(day, Provenance::Fresh { updated_at: now }))
            .ok_or(RefreshError::NoDataForToday)
    }

    async fn fetch_month(
        &self,
        position: Position,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<MonthlyTimings, RefreshError> {
        let query = CalendarQuery {
            position,
            method: self.method,
            month: today.month(),
            year: today.year(),
        };
        debug!(?query, "Fetching latest times...");

        let days = self
            .source
            .fetch_month(&query)
            .await
            .map_err(RefreshError::from_fetch)?;

        Ok(MonthlyTimings::new(
            days,
            position,
            query.month,
            query.year,
            now,
        ))
    }

    /// Render today's entry from whatever is cached now, or leave the error state.
    fn fall_back_to_cache(&self, today: NaiveDate, location_failed: bool, report: &mut LoadReport) {
        let Some(cached) = self.cache.load_or_none() else {
            if location_failed {
                report.notify(Notice::new(
                    "No cached data and location unavailable. Connect to internet and try again.",
                ));
            }
            return;
        };

        match Self::cached_view(&cached, today) {
            Some(view) => {
                info!(fetched_at = %cached.fetched_at, "Rendered prayer times from cache");
                report.location = LocationStatus::Known(cached.position());
                report.view = Some(view);
            }
            None if !cached.is_for_month_of(today) => {
                report.notify(Notice::new(if location_failed {
                    "Cached data is for a different month/year and location is unavailable."
                } else {
                    "Cached data is for a different month/year and new fetch failed."
                }));
            }
            None => {
                report.notify(Notice::new(
                    "Cached data available, but no times for today found.",
                ));
            }
        }
    }

    fn cached_view(cached: &MonthlyTimings, today: NaiveDate) -> Option<TodayView> {
        cached.day(today).and_then(|day| {
            TodayView::from_day(
                day,
                Provenance::Cached {
                    fetched_at: cached.fetched_at,
                },
            )
        })
    }
}
