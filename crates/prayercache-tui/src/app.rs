//! Application state management for prayercache.
//!
//! This module contains the `App` struct that holds what is on screen, the
//! transient notices, and the channel the background load reports back on.

use std::time::{Duration, Instant};

use prayercache_core::prayer::{LocationStatus, Notice, TodayView};
use prayercache_core::{AppClient, LoadReport};
use tokio::sync::mpsc;
use tracing::{debug, info};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background load channel.
/// At most one load is in flight, so a small buffer is plenty.
const CHANNEL_BUFFER_SIZE: usize = 4;

/// How long a notice stays on screen.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(7);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

/// Notices currently on screen, oldest first.
#[derive(Debug, Default)]
pub struct Notices {
    active: Vec<(Notice, Instant)>,
}

impl Notices {
    pub fn push(&mut self, notice: Notice, now: Instant) {
        // The same message again just restarts its timer
        self.active.retain(|(n, _)| *n != notice);
        self.active.push((notice, now));
    }

    pub fn expire(&mut self, now: Instant) {
        self.active
            .retain(|(_, shown_at)| now.duration_since(*shown_at) < NOTICE_LIFETIME);
    }

    pub fn dismiss_all(&mut self) {
        self.active.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.active.iter().map(|(n, _)| n)
    }
}

pub struct App {
    client: AppClient,
    pub state: AppState,

    // What the screen shows
    pub view: Option<TodayView>,
    pub location: LocationStatus,
    pub notices: Notices,

    // Background load
    loading: bool,
    load_tx: mpsc::Sender<LoadReport>,
    load_rx: mpsc::Receiver<LoadReport>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    pub fn new(client: AppClient) -> Self {
        let (load_tx, load_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            client,
            state: AppState::Normal,
            view: None,
            location: LocationStatus::Unknown,
            notices: Notices::default(),
            loading: false,
            load_tx,
            load_rx,
            status_message: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Spawn a background load. Returns false if one is already in flight.
    pub fn start_load(&mut self, force_refresh: bool) -> bool {
        if self.loading {
            debug!("Load already in flight, ignoring request");
            return false;
        }
        self.loading = true;
        self.status_message = Some(if force_refresh {
            "Refreshing times...".to_string()
        } else {
            "Fetching latest times...".to_string()
        });

        let client = self.client.clone();
        let tx = self.load_tx.clone();
        tokio::spawn(async move {
            let report = client.load(force_refresh).await;
            // Receiver only goes away when the app is shutting down
            let _ = tx.send(report).await;
        });

        info!(force_refresh, "Started prayer time load");
        true
    }

    /// Apply finished loads and drop expired notices.
    pub fn check_background_tasks(&mut self) {
        while let Ok(report) = self.load_rx.try_recv() {
            self.apply_report(report, Instant::now());
        }
        self.notices.expire(Instant::now());
    }

    /// Fold a load result into the screen. A load without times keeps whatever was shown.
    pub fn apply_report(&mut self, report: LoadReport, now: Instant) {
        self.loading = false;
        self.status_message = None;
        self.location = report.location;
        if let Some(view) = report.view {
            self.view = Some(view);
        }
        for notice in report.notices {
            self.notices.push(notice, now);
        }
    }

    /// Text for the line under the times
    pub fn last_updated_line(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }
        self.view
            .as_ref()
            .map(|v| v.provenance.last_updated_line())
            .unwrap_or_default()
    }
}
