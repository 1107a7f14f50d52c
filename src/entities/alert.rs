use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    // Declaration order drives Ord: Info < Warning < Critical.
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "高危",
            Severity::Warning => "警告",
            Severity::Info => "提示",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// Disposition state of an alert.
///
/// Moves forward only: `pending -> processing -> resolved`, or
/// `processing -> resolved-false-positive` when the operator dismisses it.
/// Both resolved states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "resolved-false-positive")]
    FalsePositive,
}

impl AlertStatus {
    pub fn can_advance_to(&self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (AlertStatus::Pending, AlertStatus::Processing)
                | (AlertStatus::Processing, AlertStatus::Resolved)
                | (AlertStatus::Processing, AlertStatus::FalsePositive)
        )
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            AlertStatus::Pending | AlertStatus::Processing => false,
            AlertStatus::Resolved | AlertStatus::FalsePositive => true,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "待处理",
            AlertStatus::Processing => "处理中",
            AlertStatus::Resolved => "已解决",
            AlertStatus::FalsePositive => "误报",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Processing => "processing",
            AlertStatus::Resolved => "resolved",
            AlertStatus::FalsePositive => "resolved-false-positive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub severity: Severity,
    /// Triggering condition, e.g. 未佩戴安全帽. Doubles as the violation type in reports.
    pub title: String,
    pub location: String,
    pub occurred_at: DateTime<Utc>,
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AlertRecord {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        location: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            title: title.into(),
            location: location.into(),
            occurred_at,
            status: AlertStatus::Pending,
            person: None,
            team: None,
            image: None,
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: AlertStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_subject(mut self, person: impl Into<String>, team: impl Into<String>) -> Self {
        self.person = Some(person.into());
        self.team = Some(team.into());
        self
    }

    /// Checks the fields a feed must always deliver.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::MalformedRecord("alert id is empty".into()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::MalformedRecord(format!("alert {} has no title", self.id)));
        }
        if self.location.trim().is_empty() {
            return Err(Error::MalformedRecord(format!("alert {} has no location", self.id)));
        }
        Ok(())
    }

    /// Applies one forward step of the status machine. Leaves the record untouched on error.
    pub fn transition(&mut self, next: AlertStatus, at: DateTime<Utc>) -> Result<()> {
        if !self.status.can_advance_to(next) {
            return Err(Error::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Some(at);
        Ok(())
    }
}
