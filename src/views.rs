//! Per-view state and the read-only projections each dashboard page renders.
//!
//! Each view owns its own selection/filter state; nothing here is shared
//! between views or mutates the store.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::entities::{AlertRecord, AlertStatus, CameraDescriptor, Severity};
use crate::filter::{self, AlertQuery, EMPTY_RESULT_MESSAGE};
use crate::store::{ConnectionState, SiteSnapshot};

const RECENT_ALERTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Overview,
    VideoWall,
    Map,
    Alerts,
    Reports,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Overview,
        Route::VideoWall,
        Route::Map,
        Route::Alerts,
        Route::Reports,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Overview => "/",
            Route::VideoWall => "/video-wall",
            Route::Map => "/map",
            Route::Alerts => "/alerts",
            Route::Reports => "/reports",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Overview => "总览",
            Route::VideoWall => "视频墙",
            Route::Map => "电子地图",
            Route::Alerts => "报警中心",
            Route::Reports => "报表中心",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Route::ALL.into_iter().find(|r| r.path() == trimmed)
    }
}

/// Footer connection indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionBanner {
    pub label: &'static str,
    pub stale: bool,
    #[serde(flatten)]
    pub state: ConnectionState,
}

impl From<&ConnectionState> for ConnectionBanner {
    fn from(state: &ConnectionState) -> Self {
        Self {
            label: state.label(),
            stale: !state.is_live(),
            state: state.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertsView {
    pub query: AlertQuery,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertsPage {
    pub alerts: Vec<AlertRecord>,
    pub selected: Option<AlertRecord>,
    pub pending_badge: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    pub connection: ConnectionBanner,
}

impl AlertsView {
    /// The requested selection if it survives the filter, otherwise the first match.
    pub fn render(&self, snapshot: &SiteSnapshot) -> AlertsPage {
        let alerts = filter::filter_alerts(&snapshot.alerts, &self.query);
        let selected = self
            .selected
            .as_deref()
            .and_then(|id| alerts.iter().find(|a| a.id == id))
            .or_else(|| alerts.first())
            .cloned();

        AlertsPage {
            empty_message: alerts.is_empty().then_some(EMPTY_RESULT_MESSAGE),
            pending_badge: filter::pending_badge(&snapshot.alerts),
            selected,
            alerts,
            connection: ConnectionBanner::from(&snapshot.connection),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewStats {
    pub open_alerts: usize,
    pub critical_open: usize,
    pub alerts_today: usize,
    pub cameras_online: usize,
    pub cameras_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneActivity {
    pub zone: String,
    pub cameras: usize,
    pub open_alerts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewPage {
    pub stats: OverviewStats,
    pub recent_alerts: Vec<AlertRecord>,
    pub zones: Vec<ZoneActivity>,
    pub navigation: Vec<NavItem>,
    pub connection: ConnectionBanner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub route: Route,
    pub path: &'static str,
    pub label: &'static str,
}

pub fn overview(snapshot: &SiteSnapshot, cameras: &[CameraDescriptor], today: NaiveDate) -> OverviewPage {
    let alerts = snapshot.alerts.as_slice();
    let open = |a: &&AlertRecord| a.status.is_open();

    let stats = OverviewStats {
        open_alerts: alerts.iter().filter(open).count(),
        critical_open: alerts
            .iter()
            .filter(open)
            .filter(|a| a.severity == Severity::Critical)
            .count(),
        alerts_today: alerts
            .iter()
            .filter(|a| a.occurred_at.date_naive() == today)
            .filter(|a| a.status != AlertStatus::FalsePositive)
            .count(),
        cameras_online: cameras.iter().filter(|c| c.status.is_online()).count(),
        cameras_total: cameras.len(),
    };

    let mut zones: BTreeMap<&str, ZoneActivity> = BTreeMap::new();
    for camera in cameras {
        zones
            .entry(camera.zone.as_str())
            .or_insert_with(|| ZoneActivity {
                zone: camera.zone.clone(),
                cameras: 0,
                open_alerts: 0,
            })
            .cameras += 1;
    }
    // Alert locations are free text; attribute an alert to a zone when the
    // location names one of the zone's cameras or the zone itself.
    for alert in alerts.iter().filter(open) {
        let zone = cameras
            .iter()
            .find(|c| alert.location == c.name || alert.location.contains(c.zone.as_str()))
            .map(|c| c.zone.as_str());
        if let Some(activity) = zone.and_then(|z| zones.get_mut(z)) {
            activity.open_alerts += 1;
        }
    }

    OverviewPage {
        stats,
        recent_alerts: alerts.iter().take(RECENT_ALERTS).cloned().collect(),
        zones: zones.into_values().collect(),
        navigation: Route::ALL
            .into_iter()
            .map(|route| NavItem {
                route,
                path: route.path(),
                label: route.label(),
            })
            .collect(),
        connection: ConnectionBanner::from(&snapshot.connection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StatusTab;
    use crate::seed;
    use crate::store::AlertStore;

    fn snapshot() -> SiteSnapshot {
        AlertStore::with_records(seed::demo_alerts()).unwrap().snapshot()
    }

    #[test]
    fn test_routes() {
        assert_eq!(Route::from_path("/"), Some(Route::Overview));
        assert_eq!(Route::from_path("/video-wall/"), Some(Route::VideoWall));
        assert_eq!(Route::from_path("/devices"), None);
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_alerts_default_selection_is_first() {
        let page = AlertsView::default().render(&snapshot());
        assert_eq!(page.alerts.len(), 6);
        assert_eq!(page.selected.unwrap().id, "ALT-20251211-001");
        assert_eq!(page.pending_badge, 1);
        assert!(page.empty_message.is_none());
    }

    #[test]
    fn test_selection_falls_back_when_filtered_out() {
        let view = AlertsView {
            query: AlertQuery::tab(StatusTab::Resolved),
            selected: Some("ALT-20251211-001".into()),
        };
        let page = view.render(&snapshot());
        assert_eq!(page.selected.unwrap().id, "ALT-20251211-003");

        let view = AlertsView {
            query: AlertQuery::tab(StatusTab::Resolved),
            selected: Some("ALT-20251211-006".into()),
        };
        assert_eq!(view.render(&snapshot()).selected.unwrap().id, "ALT-20251211-006");
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let view = AlertsView {
            query: AlertQuery {
                tab: StatusTab::All,
                search: Some("no such alert".into()),
            },
            selected: None,
        };
        let page = view.render(&snapshot());
        assert!(page.alerts.is_empty());
        assert!(page.selected.is_none());
        assert_eq!(page.empty_message, Some(EMPTY_RESULT_MESSAGE));
    }

    #[test]
    fn test_overview_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 11).unwrap();
        let page = overview(&snapshot(), &seed::demo_cameras(), today);

        assert_eq!(page.stats.open_alerts, 2);
        assert_eq!(page.stats.critical_open, 1);
        assert_eq!(page.stats.alerts_today, 6);
        assert_eq!(page.stats.cameras_online, 8);
        assert_eq!(page.stats.cameras_total, 9);
        assert_eq!(page.recent_alerts.len(), 5);
        assert_eq!(page.navigation.len(), 5);

        let pit = page.zones.iter().find(|z| z.zone == "基坑区").unwrap();
        assert_eq!(pit.cameras, 2);
        assert_eq!(pit.open_alerts, 1);
    }
}
