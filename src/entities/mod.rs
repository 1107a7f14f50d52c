pub mod alert;
pub mod camera;
pub mod map_point;
pub mod report_row;

pub use alert::{AlertRecord, AlertStatus, Severity};
pub use camera::{CameraDescriptor, CameraStatus};
pub use map_point::{MapPoint, MarkerKind, MarkerStatus};
pub use report_row::{ReportLevel, ReportRow, ReportStatus};
