//! Report center: KPIs, trend, distribution and the detail table.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{query_params, AppState};
use crate::error::{Error, Result};
use crate::report::{self, Period, Report, ReportFilter};
use crate::views::ConnectionBanner;

/// Raw query values; dates are parsed here so bad input maps to `InvalidPeriod`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    /// `week` (default), `month` or `custom`.
    pub period: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Team name; `all` or absent means every team.
    pub team: Option<String>,
    /// Alert location, same `all` handling as `team`.
    pub area: Option<String>,
    #[serde(rename = "type")]
    pub violation_type: Option<String>,
    /// Reference day for week/month windows. Defaults to today (UTC).
    pub as_of: Option<String>,
}

fn parse_date(name: &str, raw: &str) -> Result<NaiveDate> {
    raw.trim()
        .parse::<NaiveDate>()
        .map_err(|e| Error::InvalidPeriod(format!("{}={:?}: {}", name, raw, e)))
}

fn selector(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
        .map(str::to_string)
}

impl ReportParams {
    pub fn to_filter(&self) -> Result<ReportFilter> {
        let period = match self.period.as_deref().unwrap_or("week") {
            "week" => Period::Week,
            "month" => Period::Month,
            "custom" => match (self.from.as_deref(), self.to.as_deref()) {
                (Some(from), Some(to)) => Period::Custom {
                    from: parse_date("from", from)?,
                    to: parse_date("to", to)?,
                },
                _ => {
                    return Err(Error::InvalidPeriod(
                        "custom period needs both from and to".into(),
                    ))
                }
            },
            other => return Err(Error::InvalidPeriod(format!("unknown period {:?}", other))),
        };
        Ok(ReportFilter {
            period,
            team: selector(&self.team),
            area: selector(&self.area),
            violation_type: selector(&self.violation_type),
        })
    }

    pub fn reference_day(&self) -> Result<NaiveDate> {
        match self.as_of.as_deref() {
            Some(raw) => parse_date("as_of", raw),
            None => Ok(Utc::now().date_naive()),
        }
    }
}

#[derive(Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub connection: ConnectionBanner,
}

// GET /api/reports
pub async fn get_report(
    State(state): State<AppState>,
    query: std::result::Result<Query<ReportParams>, QueryRejection>,
) -> Result<Json<ReportResponse>> {
    let params = query_params(query)?;
    let filter = params.to_filter()?;
    let today = params.reference_day()?;
    let snapshot = state.snapshot();

    let report = report::aggregate(&snapshot.alerts, &filter, today)?;
    tracing::debug!(total = report.kpi.total, "Built report");

    Ok(Json(ReportResponse {
        report,
        connection: ConnectionBanner::from(&snapshot.connection),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_to_filter() {
        let params = ReportParams {
            period: Some("month".into()),
            team: Some("all".into()),
            ..Default::default()
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.period, Period::Month);
        assert!(filter.team.is_none());

        let params = ReportParams {
            period: Some("custom".into()),
            from: Some("2025-12-01".into()),
            ..Default::default()
        };
        assert!(matches!(params.to_filter(), Err(Error::InvalidPeriod(_))));

        let params = ReportParams {
            period: Some("quarter".into()),
            ..Default::default()
        };
        assert!(matches!(params.to_filter(), Err(Error::InvalidPeriod(_))));
    }

    #[test]
    fn test_area_and_type_selectors() {
        let params = ReportParams {
            area: Some("基坑东侧".into()),
            violation_type: Some(" all ".into()),
            ..Default::default()
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.area.as_deref(), Some("基坑东侧"));
        assert!(filter.violation_type.is_none());
    }

    #[test]
    fn test_bad_dates_are_invalid_period() {
        let params = ReportParams {
            period: Some("custom".into()),
            from: Some("2025-13-01".into()),
            to: Some("2025-12-02".into()),
            ..Default::default()
        };
        assert!(matches!(params.to_filter(), Err(Error::InvalidPeriod(_))));

        let params = ReportParams {
            as_of: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(params.reference_day(), Err(Error::InvalidPeriod(_))));
    }
}
