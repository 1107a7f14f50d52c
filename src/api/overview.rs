use axum::{extract::State, Json};
use chrono::Utc;

use super::AppState;
use crate::views::{self, OverviewPage};

// GET /api/overview
pub async fn get_overview(State(state): State<AppState>) -> Json<OverviewPage> {
    let snapshot = state.snapshot();
    Json(views::overview(&snapshot, &state.cameras, Utc::now().date_naive()))
}
