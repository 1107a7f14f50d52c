use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

use super::AppState;
use crate::store::SiteSnapshot;
use crate::views::ConnectionBanner;

/// Change notification sent to dashboards; clients refetch the views they show.
#[derive(Serialize)]
struct SnapshotEvent {
    version: u64,
    total_alerts: usize,
    open_alerts: usize,
    connection: ConnectionBanner,
}

fn to_event(snapshot: &SiteSnapshot) -> Event {
    let payload = SnapshotEvent {
        version: snapshot.version,
        total_alerts: snapshot.alerts.len(),
        open_alerts: snapshot.alerts.iter().filter(|a| a.status.is_open()).count(),
        connection: ConnectionBanner::from(&snapshot.connection),
    };
    Event::default()
        .event("snapshot")
        .id(snapshot.version.to_string())
        .json_data(payload)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

// GET /api/events
pub async fn stream_snapshots(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.snapshots.clone();

    // The first item is the current snapshot, then one per published change.
    let stream = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot: Arc<SiteSnapshot> = rx.borrow_and_update().clone();
        Some((Ok(to_event(&snapshot)), (rx, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
