use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{MapPoint, MarkerKind, MarkerStatus};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::MalformedRecord(format!(
                "viewport {}x{} must be positive",
                width, height
            )));
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPosition {
    pub left: f64,
    pub top: f64,
}

/// Places site-plan markers inside a rendering viewport.
///
/// Swap the implementation for a georeferenced or CAD transform when the
/// site plan gets real coordinates.
pub trait SiteProjection {
    fn project(&self, point: &MapPoint, viewport: Viewport) -> PixelPosition;
}

/// Treats `x`/`y` as percentages of the viewport's bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentProjection;

impl SiteProjection for PercentProjection {
    fn project(&self, point: &MapPoint, viewport: Viewport) -> PixelPosition {
        PixelPosition {
            left: point.x * viewport.width / 100.0,
            top: point.y * viewport.height / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerTone {
    Active,
    Alarm,
    Muted,
}

impl From<MarkerStatus> for MarkerTone {
    fn from(status: MarkerStatus) -> Self {
        match status {
            MarkerStatus::Normal => MarkerTone::Active,
            MarkerStatus::Warning => MarkerTone::Alarm,
            MarkerStatus::Offline => MarkerTone::Muted,
        }
    }
}

impl MarkerTone {
    /// Offline markers do not get the ripple animation.
    pub fn pulses(&self) -> bool {
        match self {
            MarkerTone::Active | MarkerTone::Alarm => true,
            MarkerTone::Muted => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub point: MapPoint,
    pub position: PixelPosition,
    pub tone: MarkerTone,
    pub pulses: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub by_kind: BTreeMap<MarkerKind, usize>,
    pub by_status: BTreeMap<MarkerStatus, usize>,
}

pub fn markers<P: SiteProjection>(projection: &P, points: &[MapPoint], viewport: Viewport) -> Vec<Marker> {
    points
        .iter()
        .map(|point| {
            let tone = MarkerTone::from(point.status);
            Marker {
                position: projection.project(point, viewport),
                tone,
                pulses: tone.pulses(),
                point: point.clone(),
            }
        })
        .collect()
}

pub fn legend(points: &[MapPoint]) -> Legend {
    let mut legend = Legend::default();
    for point in points {
        *legend.by_kind.entry(point.kind).or_insert(0) += 1;
        *legend.by_status.entry(point.status).or_insert(0) += 1;
    }
    legend
}
