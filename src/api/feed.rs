//! Ingestion endpoints for the upstream alert feed.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::AppState;
use crate::entities::AlertRecord;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct FeedStatusRequest {
    pub connected: bool,
    pub reason: Option<String>,
}

// POST /api/feed/alerts
pub async fn ingest_alert(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(payload) = body.map_err(|e| Error::MalformedRecord(e.body_text()))?;
    let record: AlertRecord = serde_json::from_value(payload).map_err(|e| {
        warn!("Rejected malformed feed payload: {}", e);
        crate::metrics::increment_alerts_rejected("MALFORMED_RECORD");
        Error::MalformedRecord(e.to_string())
    })?;

    info!(alert_id = %record.id, status = %record.status, "Received feed alert");
    let alert_id = record.id.clone();
    state.feed.ingest(record).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "queued", "alert_id": alert_id })),
    ))
}

// POST /api/feed/status
pub async fn update_status(
    State(state): State<AppState>,
    body: std::result::Result<Json<FeedStatusRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(payload) = body.map_err(|e| Error::MalformedRecord(e.body_text()))?;
    if payload.connected {
        state.feed.reconnected().await?;
    } else {
        let reason = payload.reason.unwrap_or_else(|| "feed reported disconnect".to_string());
        state.feed.disconnected(reason).await?;
    }
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "queued" }))))
}
