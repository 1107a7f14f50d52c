use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraStatus {
    Online,
    Offline,
    Alert,
}

impl CameraStatus {
    pub fn is_online(&self) -> bool {
        match self {
            CameraStatus::Online | CameraStatus::Alert => true,
            CameraStatus::Offline => false,
        }
    }
}

/// Camera as supplied by the device registry. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub id: String,
    pub name: String,
    pub zone: String,
    pub status: CameraStatus,
}

impl CameraDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        zone: impl Into<String>,
        status: CameraStatus,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            zone: zone.into(),
            status,
        }
    }
}
