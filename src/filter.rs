use serde::{Deserialize, Serialize};

use crate::entities::{AlertRecord, AlertStatus};
use crate::store::sort_newest_first;

pub const EMPTY_RESULT_MESSAGE: &str = "暂无相关报警记录";

/// Status tabs of the alert center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTab {
    #[default]
    All,
    /// Anything not yet closed: pending or processing.
    Pending,
    /// Closed, including false positives.
    Resolved,
}

impl StatusTab {
    pub fn matches(&self, status: AlertStatus) -> bool {
        match self {
            StatusTab::All => true,
            StatusTab::Pending => status.is_open(),
            StatusTab::Resolved => status.is_terminal(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AlertQuery {
    #[serde(default)]
    pub tab: StatusTab,
    /// Case-insensitive match against id, title and location.
    #[serde(default)]
    pub search: Option<String>,
}

impl AlertQuery {
    pub fn tab(tab: StatusTab) -> Self {
        Self { tab, search: None }
    }

    fn matches(&self, alert: &AlertRecord) -> bool {
        if !self.tab.matches(alert.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&alert.id, &alert.title, &alert.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Returns the matching alerts, newest first by `occurred_at`.
pub fn filter_alerts(alerts: &[AlertRecord], query: &AlertQuery) -> Vec<AlertRecord> {
    let mut matched: Vec<AlertRecord> = alerts.iter().filter(|a| query.matches(a)).cloned().collect();
    sort_newest_first(&mut matched);
    matched
}

/// Count for the "N 待处理" badge: strictly pending, not processing.
pub fn pending_badge(alerts: &[AlertRecord]) -> usize {
    alerts.iter().filter(|a| a.status == AlertStatus::Pending).count()
}
