pub mod alerts;
pub mod events;
pub mod feed;
pub mod map;
pub mod overview;
pub mod reports;
pub mod video_wall;

use axum::{
    extract::{rejection::QueryRejection, Query},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::FeedConfig;
use crate::entities::{CameraDescriptor, MapPoint};
use crate::error::{Error, Result};
use crate::feed::{spawn_ingest, FeedHandle, IngestService};
use crate::seed::SeedData;
use crate::store::{AlertStore, SiteSnapshot};

/// Shared handles for the handlers. Views read snapshots; only the feed handle writes.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedHandle,
    pub snapshots: watch::Receiver<Arc<SiteSnapshot>>,
    pub cameras: Arc<Vec<CameraDescriptor>>,
    pub map_points: Arc<Vec<MapPoint>>,
}

impl AppState {
    /// Loads the seed into a fresh store and starts the ingest task.
    pub fn spawn(seed: SeedData, feed: &FeedConfig) -> Result<(Self, JoinHandle<AlertStore>)> {
        let store = AlertStore::with_records(seed.alerts)?;
        let IngestService {
            handle,
            snapshots,
            task,
        } = spawn_ingest(store, feed);

        let state = Self {
            feed: handle,
            snapshots,
            cameras: Arc::new(seed.cameras),
            map_points: Arc::new(seed.map_points),
        };
        Ok((state, task))
    }

    pub fn snapshot(&self) -> Arc<SiteSnapshot> {
        self.snapshots.borrow().clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/overview", get(overview::get_overview))
        .route("/api/alerts", get(alerts::list_alerts))
        .route("/api/alerts/:id", get(alerts::get_alert))
        .route("/api/alerts/:id/acknowledge", post(alerts::acknowledge_alert))
        .route("/api/alerts/:id/resolve", post(alerts::resolve_alert))
        .route("/api/alerts/:id/false-positive", post(alerts::mark_false_positive))
        .route("/api/reports", get(reports::get_report))
        .route("/api/video-wall", get(video_wall::get_video_wall))
        .route("/api/map", get(map::get_map))
        .route("/api/feed/alerts", post(feed::ingest_alert))
        .route("/api/feed/status", post(feed::update_status))
        .route("/api/events", get(events::stream_snapshots))
        .with_state(state)
}

/// Unwraps a query extraction, turning axum's plain-text rejection into a JSON [`Error`].
pub(crate) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::MalformedRecord(rejection.body_text()))
}

async fn health_check() -> &'static str {
    "OK"
}
