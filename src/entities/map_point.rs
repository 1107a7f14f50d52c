use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Camera,
    Sensor,
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStatus {
    Normal,
    Warning,
    Offline,
}

/// A marker on the site plan. `x` and `y` are percentages of the plan's
/// bounding box, not pixels and not geographic coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub kind: MarkerKind,
    pub status: MarkerStatus,
}

impl MapPoint {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        x: f64,
        y: f64,
        kind: MarkerKind,
        status: MarkerStatus,
    ) -> Result<Self> {
        let point = Self {
            id: id.into(),
            label: label.into(),
            x,
            y,
            kind,
            status,
        };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.x) || !in_range(self.y) {
            return Err(Error::MalformedRecord(format!(
                "map point {} at ({}, {}) is outside the 0-100% plan box",
                self.id, self.x, self.y
            )));
        }
        Ok(())
    }
}
