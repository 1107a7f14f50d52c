use crate::entities::AlertStatus;
use crate::store::{ConnectionState, SiteSnapshot};

pub fn init_metrics(snapshot: &SiteSnapshot) {
    record_snapshot(snapshot);
    tracing::info!(
        "Initialized metrics: Alerts={}, Version={}",
        snapshot.alerts.len(),
        snapshot.version
    );
}

/// Refresh gauges derived from the whole store.
pub fn record_snapshot(snapshot: &SiteSnapshot) {
    let open = snapshot.alerts.iter().filter(|a| a.status.is_open()).count();
    metrics::gauge!("sitewatch_alerts_total").set(snapshot.alerts.len() as f64);
    metrics::gauge!("sitewatch_alerts_open").set(open as f64);
    record_connection(&snapshot.connection);
}

pub fn record_connection(connection: &ConnectionState) {
    let value = match connection {
        ConnectionState::Live => 1.0,
        ConnectionState::Stale { .. } => 0.5,
        ConnectionState::Down { .. } => 0.0,
    };
    metrics::gauge!("sitewatch_feed_connected").set(value);
}

pub fn increment_alerts_ingested(change: &str) {
    metrics::counter!("sitewatch_alerts_ingested_total", "change" => change.to_string()).increment(1);
}

pub fn increment_alerts_rejected(reason: &str) {
    metrics::counter!("sitewatch_alerts_rejected_total", "reason" => reason.to_string()).increment(1);
}

pub fn increment_transitions(to: AlertStatus) {
    metrics::counter!("sitewatch_alert_transitions_total", "to" => to.to_string()).increment(1);
}
