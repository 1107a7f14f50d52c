use serde::{Deserialize, Serialize};

use crate::entities::{CameraDescriptor, CameraStatus};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GridSize {
    Two,
    #[default]
    Three,
    Four,
}

impl GridSize {
    pub fn side(&self) -> usize {
        match self {
            GridSize::Two => 2,
            GridSize::Three => 3,
            GridSize::Four => 4,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.side() * self.side()
    }

    /// Parses the `size` query value; anything but 2, 3 or 4 is `InvalidGridSize`.
    pub fn parse(raw: &str) -> Result<Self> {
        let n = raw
            .trim()
            .parse::<u8>()
            .map_err(|_| Error::InvalidGridSize(raw.to_string()))?;
        GridSize::try_from(n)
    }
}

impl TryFrom<u8> for GridSize {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            2 => Ok(GridSize::Two),
            3 => Ok(GridSize::Three),
            4 => Ok(GridSize::Four),
            other => Err(Error::InvalidGridSize(other.to_string())),
        }
    }
}

impl From<GridSize> for u8 {
    fn from(size: GridSize) -> u8 {
        size.side() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum GridSlot {
    Camera {
        index: usize,
        camera: CameraDescriptor,
        selected: bool,
        alarm: bool,
    },
    /// No camera for this position: rendered as "no signal", keyed by index.
    Empty { index: usize, channel: String },
}

impl GridSlot {
    pub fn index(&self) -> usize {
        match self {
            GridSlot::Camera { index, .. } | GridSlot::Empty { index, .. } => *index,
        }
    }

    pub fn camera_id(&self) -> Option<&str> {
        match self {
            GridSlot::Camera { camera, .. } => Some(camera.id.as_str()),
            GridSlot::Empty { .. } => None,
        }
    }
}

/// Channel label shown on an empty slot, 1-based: `CH-01`, `CH-02`, ...
pub fn channel_label(index: usize) -> String {
    format!("CH-{:02}", index + 1)
}

/// Video wall state: grid size and at most one selected camera.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoWallState {
    size: GridSize,
    selected: Option<String>,
}

impl VideoWallState {
    pub fn new(size: GridSize) -> Self {
        Self { size, selected: None }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    fn visible<'a>(&self, cameras: &'a [CameraDescriptor]) -> &'a [CameraDescriptor] {
        &cameras[..cameras.len().min(self.size.slot_count())]
    }

    /// Selects a visible camera. Returns whether the selection changed.
    pub fn select(&mut self, cameras: &[CameraDescriptor], id: &str) -> bool {
        if self.selected.as_deref() == Some(id) {
            return false;
        }
        if !self.visible(cameras).iter().any(|c| c.id == id) {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    /// Clicking a slot; empty slots do nothing.
    pub fn select_slot(&mut self, cameras: &[CameraDescriptor], index: usize) -> bool {
        match self.visible(cameras).get(index) {
            Some(camera) => {
                let id = camera.id.clone();
                self.select(cameras, &id)
            }
            None => false,
        }
    }

    pub fn resize(&mut self, cameras: &[CameraDescriptor], size: GridSize) {
        self.size = size;
        let still_visible = self
            .selected
            .as_deref()
            .map(|id| self.visible(cameras).iter().any(|c| c.id == id))
            .unwrap_or(true);
        if !still_visible {
            self.selected = None;
        }
    }

    /// Exactly `size²` slots: cameras in list order, then empty placeholders.
    pub fn slots(&self, cameras: &[CameraDescriptor]) -> Vec<GridSlot> {
        (0..self.size.slot_count())
            .map(|index| match cameras.get(index) {
                Some(camera) => GridSlot::Camera {
                    index,
                    selected: self.selected.as_deref() == Some(camera.id.as_str()),
                    alarm: camera.status == CameraStatus::Alert,
                    camera: camera.clone(),
                },
                None => GridSlot::Empty {
                    index,
                    channel: channel_label(index),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use proptest::prelude::*;

    fn cameras(k: usize) -> Vec<CameraDescriptor> {
        (0..k)
            .map(|i| CameraDescriptor::new(format!("CAM-{:02}", i + 1), "cam", "zone", CameraStatus::Online))
            .collect()
    }

    #[test]
    fn test_grid_size_parsing() {
        assert_eq!(GridSize::try_from(4).unwrap().slot_count(), 16);
        assert!(matches!(GridSize::try_from(5), Err(Error::InvalidGridSize(_))));
        assert_eq!(GridSize::parse(" 2 ").unwrap(), GridSize::Two);
        assert!(matches!(GridSize::parse("300"), Err(Error::InvalidGridSize(_))));
        assert!(matches!(GridSize::parse("big"), Err(Error::InvalidGridSize(_))));
        let size: GridSize = serde_json::from_str("2").unwrap();
        assert_eq!(size, GridSize::Two);
        assert!(serde_json::from_str::<GridSize>("1").is_err());
    }

    #[test]
    fn test_four_by_four_pads_sample_site() {
        let cams = seed::demo_cameras();
        let wall = VideoWallState::new(GridSize::Four);
        let slots = wall.slots(&cams);
        assert_eq!(slots.len(), 16);
        assert_eq!(slots.iter().filter(|s| s.camera_id().is_some()).count(), 9);
        assert_eq!(
            slots[9],
            GridSlot::Empty {
                index: 9,
                channel: "CH-10".into()
            }
        );
        assert!(matches!(slots[2], GridSlot::Camera { alarm: true, .. }));
    }

    #[test]
    fn test_select_is_idempotent_and_exclusive() {
        let cams = seed::demo_cameras();
        let mut wall = VideoWallState::default();
        assert!(wall.select(&cams, "CAM-03"));
        assert!(!wall.select(&cams, "CAM-03"));
        assert!(wall.select(&cams, "CAM-05"));

        let slots = wall.slots(&cams);
        let selected: Vec<_> = slots
            .iter()
            .filter(|s| matches!(s, GridSlot::Camera { selected: true, .. }))
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].camera_id(), Some("CAM-05"));
    }

    #[test]
    fn test_cannot_select_hidden_or_empty() {
        let cams = seed::demo_cameras();
        let mut wall = VideoWallState::new(GridSize::Two);
        assert!(!wall.select(&cams, "CAM-09"));
        assert!(!wall.select(&cams, "CAM-99"));

        let mut wall = VideoWallState::new(GridSize::Four);
        assert!(!wall.select_slot(&cams, 12));
        assert!(wall.selected().is_none());
    }

    #[test]
    fn test_shrinking_drops_hidden_selection() {
        let cams = seed::demo_cameras();
        let mut wall = VideoWallState::default();
        wall.select(&cams, "CAM-07");
        wall.resize(&cams, GridSize::Two);
        assert!(wall.selected().is_none());

        wall.select(&cams, "CAM-02");
        wall.resize(&cams, GridSize::Four);
        assert_eq!(wall.selected(), Some("CAM-02"));
    }

    proptest! {
        #[test]
        fn prop_slot_accounting(k in 0usize..24, n in 2u8..=4) {
            let cams = cameras(k);
            let wall = VideoWallState::new(GridSize::try_from(n).unwrap());
            let slots = wall.slots(&cams);
            let n2 = (n as usize) * (n as usize);

            prop_assert_eq!(slots.len(), n2);
            prop_assert_eq!(slots.iter().filter(|s| s.camera_id().is_some()).count(), k.min(n2));
            prop_assert_eq!(slots.iter().filter(|s| s.camera_id().is_none()).count(), n2.saturating_sub(k));
            for (i, slot) in slots.iter().enumerate() {
                prop_assert_eq!(slot.index(), i);
            }
        }
    }
}
