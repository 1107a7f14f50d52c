use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{query_params, AppState};
use crate::error::Result;
use crate::map::{self, Legend, Marker, PercentProjection, Viewport};

#[derive(Debug, Default, Deserialize)]
pub struct MapParams {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Serialize)]
pub struct MapResponse {
    pub viewport: Viewport,
    pub markers: Vec<Marker>,
    pub legend: Legend,
}

// GET /api/map
pub async fn get_map(
    State(state): State<AppState>,
    query: std::result::Result<Query<MapParams>, QueryRejection>,
) -> Result<Json<MapResponse>> {
    let params = query_params(query)?;
    // Without a viewport, positions come back as plain percentages.
    let viewport = Viewport::new(params.width.unwrap_or(100.0), params.height.unwrap_or(100.0))?;

    Ok(Json(MapResponse {
        viewport,
        markers: map::markers(&PercentProjection, &state.map_points, viewport),
        legend: map::legend(&state.map_points),
    }))
}
