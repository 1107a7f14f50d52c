//! Alert center routes and operator actions.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{query_params, AppState};
use crate::entities::{AlertRecord, AlertStatus};
use crate::error::{Error, Result};
use crate::filter::{AlertQuery, StatusTab};
use crate::views::{AlertsPage, AlertsView};

#[derive(Debug, Default, Deserialize)]
pub struct AlertsParams {
    pub tab: Option<StatusTab>,
    pub search: Option<String>,
    pub selected: Option<String>,
}

// GET /api/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    query: std::result::Result<Query<AlertsParams>, QueryRejection>,
) -> Result<Json<AlertsPage>> {
    let params = query_params(query)?;
    let view = AlertsView {
        query: AlertQuery {
            tab: params.tab.unwrap_or_default(),
            search: params.search,
        },
        selected: params.selected,
    };
    Ok(Json(view.render(&state.snapshot())))
}

// GET /api/alerts/:id
pub async fn get_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<AlertRecord>> {
    state
        .snapshot()
        .find(&alert_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("alert {}", alert_id)))
}

// POST /api/alerts/:id/acknowledge
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<AlertRecord>> {
    transition(&state, alert_id, AlertStatus::Processing).await
}

// POST /api/alerts/:id/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<AlertRecord>> {
    transition(&state, alert_id, AlertStatus::Resolved).await
}

// POST /api/alerts/:id/false-positive
pub async fn mark_false_positive(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<AlertRecord>> {
    transition(&state, alert_id, AlertStatus::FalsePositive).await
}

async fn transition(state: &AppState, alert_id: String, to: AlertStatus) -> Result<Json<AlertRecord>> {
    info!(alert_id = %alert_id, to = %to, "Operator requested status change");
    let updated = state.feed.transition(alert_id, to).await?;
    Ok(Json(updated))
}
