//! Startup data: either a JSON seed file or the built-in sample site.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::entities::{
    AlertRecord, AlertStatus, CameraDescriptor, CameraStatus, MapPoint, MarkerKind, MarkerStatus,
    Severity,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
    #[serde(default)]
    pub cameras: Vec<CameraDescriptor>,
    #[serde(default)]
    pub map_points: Vec<MapPoint>,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn validate(&self) -> Result<()> {
        for alert in &self.alerts {
            alert.validate()?;
        }
        for point in &self.map_points {
            point.validate()?;
        }
        for camera in &self.cameras {
            if camera.id.trim().is_empty() {
                return Err(Error::MalformedRecord("camera id is empty".into()));
            }
        }
        Ok(())
    }

    pub fn demo() -> Self {
        let mut alerts = demo_alerts();
        alerts.extend(demo_history());
        Self {
            alerts,
            cameras: demo_cameras(),
            map_points: demo_map_points(),
        }
    }
}

fn at(day: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, day, h, m, s)
        .single()
        .unwrap_or_default()
}

/// The six alerts on the alert center's sample shift: one pending, one processing, four resolved.
pub fn demo_alerts() -> Vec<AlertRecord> {
    vec![
        AlertRecord::new("ALT-20251211-001", Severity::Critical, "未佩戴安全帽", "基坑东侧", at(11, 14, 23, 45))
            .with_subject("张三 (钢筋工)", "钢筋工三组"),
        AlertRecord::new("ALT-20251211-002", Severity::Warning, "区域入侵检测", "材料堆放区", at(11, 14, 15, 20))
            .with_status(AlertStatus::Processing)
            .with_subject("未知人员", "外来人员"),
        AlertRecord::new("ALT-20251211-003", Severity::Critical, "明火烟雾检测", "加工区", at(11, 13, 50, 12))
            .with_status(AlertStatus::Resolved)
            .with_subject("系统检测", "木工二组"),
        AlertRecord::new("ALT-20251211-004", Severity::Info, "车辆违停", "大门入口", at(11, 13, 45, 0))
            .with_status(AlertStatus::Resolved),
        AlertRecord::new("ALT-20251211-006", Severity::Critical, "未佩戴反光衣", "塔吊1号", at(11, 11, 20, 33))
            .with_status(AlertStatus::Resolved)
            .with_subject("李四 (信号工)", "塔吊班组"),
        AlertRecord::new("ALT-20251211-007", Severity::Critical, "临边防护缺失", "主体施工区", at(11, 10, 15, 12))
            .with_status(AlertStatus::Resolved)
            .with_subject("王五 (安全员)", "安全巡查组"),
    ]
}

/// Earlier closed alerts that only show up in reports.
pub fn demo_history() -> Vec<AlertRecord> {
    vec![
        AlertRecord::new("ALT-20251210-004", Severity::Warning, "未佩戴安全帽", "生活区入口", at(10, 16, 40, 0))
            .with_status(AlertStatus::Resolved)
            .with_subject("赵六 (杂工)", "杂工班"),
        AlertRecord::new("ALT-20251210-002", Severity::Warning, "违规吸烟", "基坑西侧", at(10, 14, 10, 0))
            .with_status(AlertStatus::Resolved)
            .with_subject("孙七 (钢筋工)", "钢筋工三组"),
    ]
}

pub fn demo_cameras() -> Vec<CameraDescriptor> {
    vec![
        CameraDescriptor::new("CAM-01", "大门入口全景", "大门区", CameraStatus::Online),
        CameraDescriptor::new("CAM-02", "塔吊1号高空", "塔吊高空", CameraStatus::Online),
        CameraDescriptor::new("CAM-03", "基坑东侧", "基坑区", CameraStatus::Alert),
        CameraDescriptor::new("CAM-04", "材料堆放区", "加工区", CameraStatus::Offline),
        CameraDescriptor::new("CAM-05", "工人生活区A", "办公生活区", CameraStatus::Online),
        CameraDescriptor::new("CAM-06", "主体施工层3F", "主体施工区", CameraStatus::Online),
        CameraDescriptor::new("CAM-07", "车辆冲洗台", "大门区", CameraStatus::Online),
        CameraDescriptor::new("CAM-08", "基坑西侧", "基坑区", CameraStatus::Online),
        CameraDescriptor::new("CAM-09", "塔吊2号高空", "塔吊高空", CameraStatus::Online),
    ]
}

pub fn demo_map_points() -> Vec<MapPoint> {
    let point = |id: &str, label: &str, x: f64, y: f64, kind, status| MapPoint {
        id: id.to_string(),
        label: label.to_string(),
        x,
        y,
        kind,
        status,
    };
    vec![
        point("P1", "大门监控", 20.0, 30.0, MarkerKind::Camera, MarkerStatus::Normal),
        point("P2", "基坑东侧", 45.0, 40.0, MarkerKind::Camera, MarkerStatus::Warning),
        point("P3", "材料区", 70.0, 25.0, MarkerKind::Camera, MarkerStatus::Offline),
        point("P4", "扬尘监测A", 50.0, 60.0, MarkerKind::Sensor, MarkerStatus::Normal),
        point("P5", "安全员-张三", 30.0, 70.0, MarkerKind::Worker, MarkerStatus::Normal),
    ]
}
