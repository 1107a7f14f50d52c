use chrono::{DateTime, Utc};
use serde::Serialize;

use super::alert::{AlertRecord, AlertStatus, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLevel {
    High,
    General,
}

impl ReportLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ReportLevel::High => "高危",
            ReportLevel::General => "一般",
        }
    }
}

impl From<Severity> for ReportLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => ReportLevel::High,
            Severity::Warning | Severity::Info => ReportLevel::General,
        }
    }
}

// The report table speaks its own vocabulary: 已处置 / 处理中 / 待确认.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Disposed,
    InProgress,
    AwaitingConfirmation,
}

impl ReportStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Disposed => "已处置",
            ReportStatus::InProgress => "处理中",
            ReportStatus::AwaitingConfirmation => "待确认",
        }
    }

    /// `None` for false positives, which never appear in violation reports.
    pub fn from_alert(status: AlertStatus) -> Option<Self> {
        match status {
            AlertStatus::Pending => Some(ReportStatus::AwaitingConfirmation),
            AlertStatus::Processing => Some(ReportStatus::InProgress),
            AlertStatus::Resolved => Some(ReportStatus::Disposed),
            AlertStatus::FalsePositive => None,
        }
    }
}

/// Tabular projection of an [`AlertRecord`] for the report detail table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub time: DateTime<Utc>,
    pub area: String,
    #[serde(rename = "type")]
    pub violation_type: String,
    pub person: String,
    pub team: String,
    pub level: ReportLevel,
    pub level_label: &'static str,
    pub status: ReportStatus,
    pub status_label: &'static str,
}

impl ReportRow {
    pub fn project(alert: &AlertRecord) -> Option<Self> {
        let status = ReportStatus::from_alert(alert.status)?;
        let level = ReportLevel::from(alert.severity);
        Some(Self {
            id: alert.id.clone(),
            time: alert.occurred_at,
            area: alert.location.clone(),
            violation_type: alert.title.clone(),
            person: alert.person.clone().unwrap_or_else(|| "系统检测".to_string()),
            team: alert.team.clone().unwrap_or_else(|| "未分配".to_string()),
            level,
            level_label: level.label(),
            status,
            status_label: status.label(),
        })
    }
}
