//! Video wall grid for the camera list.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{query_params, AppState};
use crate::error::Result;
use crate::grid::{GridSize, GridSlot, VideoWallState};
use crate::views::ConnectionBanner;

#[derive(Debug, Default, Deserialize)]
pub struct VideoWallParams {
    /// Kept as text so any bad value reports `InvalidGridSize`.
    pub size: Option<String>,
    pub selected: Option<String>,
}

#[derive(Serialize)]
pub struct VideoWallResponse {
    pub size: GridSize,
    pub selected: Option<String>,
    pub slots: Vec<GridSlot>,
    pub connection: ConnectionBanner,
}

// GET /api/video-wall
pub async fn get_video_wall(
    State(state): State<AppState>,
    query: std::result::Result<Query<VideoWallParams>, QueryRejection>,
) -> Result<Json<VideoWallResponse>> {
    let params = query_params(query)?;
    let size = match params.size.as_deref() {
        Some(raw) => GridSize::parse(raw)?,
        None => GridSize::default(),
    };

    let mut wall = VideoWallState::new(size);
    if let Some(id) = params.selected.as_deref() {
        // Cameras outside the grid are simply not selected.
        wall.select(&state.cameras, id);
    }

    let snapshot = state.snapshot();
    Ok(Json(VideoWallResponse {
        size: wall.size(),
        selected: wall.selected().map(str::to_string),
        slots: wall.slots(&state.cameras),
        connection: ConnectionBanner::from(&snapshot.connection),
    }))
}
