//! Period-scoped safety statistics for the report center.
//!
//! Every figure is computed from alert records over the requested window;
//! there are no precomputed week/month tables. False positives are not
//! violations and are left out of every figure.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{AlertRecord, AlertStatus, ReportRow, Severity};
use crate::error::{Error, Result};

const RANKING_LIMIT: usize = 5;
const MAX_CUSTOM_DAYS: i64 = 366;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "period", rename_all = "snake_case")]
pub enum Period {
    /// Seven calendar days ending today.
    #[default]
    Week,
    /// Thirty calendar days ending today.
    Month,
    /// Inclusive date range.
    Custom { from: NaiveDate, to: NaiveDate },
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Window {
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// The window of equal length that ends the day before this one starts.
    pub fn previous(&self) -> Result<Window> {
        let to = days_before(self.from, 1)?;
        Ok(Window {
            from: days_before(to, self.days() - 1)?,
            to,
        })
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days()).map(move |i| self.from + Duration::days(i))
    }
}

impl Period {
    pub fn window(&self, today: NaiveDate) -> Result<Window> {
        match self {
            Period::Week => Ok(Window {
                from: days_before(today, 6)?,
                to: today,
            }),
            Period::Month => Ok(Window {
                from: days_before(today, 29)?,
                to: today,
            }),
            Period::Custom { from, to } => {
                if from > to {
                    return Err(Error::InvalidPeriod(format!("{} is after {}", from, to)));
                }
                let window = Window { from: *from, to: *to };
                if window.days() > MAX_CUSTOM_DAYS {
                    return Err(Error::InvalidPeriod(format!(
                        "range of {} days exceeds {}",
                        window.days(),
                        MAX_CUSTOM_DAYS
                    )));
                }
                Ok(window)
            }
        }
    }
}

fn days_before(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_sub_signed(Duration::days(days))
        .ok_or_else(|| Error::InvalidPeriod(format!("{} minus {} days is out of range", date, days)))
}

/// Report scope. Each dimension is an exact match; `None` admits everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub period: Period,
    pub team: Option<String>,
    /// Alert location (监控区域).
    pub area: Option<String>,
    /// Alert title (违规类型).
    pub violation_type: Option<String>,
}

impl ReportFilter {
    fn admits(&self, alert: &AlertRecord, window: &Window) -> bool {
        if alert.status == AlertStatus::FalsePositive {
            return false;
        }
        if !window.contains(alert.occurred_at.date_naive()) {
            return false;
        }
        let team_ok = match &self.team {
            Some(team) => alert.team.as_deref() == Some(team.as_str()),
            None => true,
        };
        team_ok
            && self.area.as_deref().map_or(true, |area| alert.location == area)
            && self
                .violation_type
                .as_deref()
                .map_or(true, |kind| alert.title == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub total: usize,
    pub resolved: usize,
    /// Resolved share of `total` in percent, one decimal.
    pub rate: f64,
    pub top_type: Option<String>,
    pub top_type_share: f64,
    pub top_area: Option<String>,
    pub top_area_count: usize,
    /// Percent change of `total` against the previous window; `None` when that window was empty.
    pub change_vs_previous: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
    pub prev_count: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaRank {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub period: Period,
    pub window: Window,
    pub team: Option<String>,
    pub area: Option<String>,
    pub violation_type: Option<String>,
    pub kpi: Kpi,
    pub trend: Vec<TrendPoint>,
    pub distribution: Vec<CategoryShare>,
    pub ranking: Vec<AreaRank>,
    pub rows: Vec<ReportRow>,
}

pub fn aggregate(alerts: &[AlertRecord], filter: &ReportFilter, today: NaiveDate) -> Result<Report> {
    let window = filter.period.window(today)?;
    let previous = window.previous()?;

    let scoped: Vec<&AlertRecord> = alerts.iter().filter(|a| filter.admits(a, &window)).collect();
    let prior: Vec<&AlertRecord> = alerts.iter().filter(|a| filter.admits(a, &previous)).collect();

    let by_type = tally(scoped.iter().map(|a| a.title.as_str()));
    let by_area = tally(scoped.iter().map(|a| a.location.as_str()));

    let total = scoped.len();
    let resolved = scoped.iter().filter(|a| a.status == AlertStatus::Resolved).count();
    let top_type = mode(&by_type);
    let top_area = mode(&by_area);

    let kpi = Kpi {
        total,
        resolved,
        rate: percent(resolved, total),
        top_type_share: top_type.map(|(_, n)| percent(n, total)).unwrap_or(0.0),
        top_type: top_type.map(|(name, _)| name.to_string()),
        top_area_count: top_area.map(|(_, n)| n).unwrap_or(0),
        top_area: top_area.map(|(name, _)| name.to_string()),
        change_vs_previous: match prior.len() {
            0 => None,
            prev => Some(round1((total as f64 - prev as f64) / prev as f64 * 100.0)),
        },
    };

    let trend = window
        .dates()
        .zip(previous.dates())
        .map(|(day, prev_day)| TrendPoint {
            date: day,
            count: count_on(&scoped, day),
            prev_count: count_on(&prior, prev_day),
            critical: scoped
                .iter()
                .filter(|a| a.occurred_at.date_naive() == day && a.severity == Severity::Critical)
                .count(),
        })
        .collect();

    let distribution = ranked(&by_type)
        .into_iter()
        .map(|(name, value)| CategoryShare {
            name: name.to_string(),
            value,
            share: percent(value, total),
        })
        .collect();

    let ranking = ranked(&by_area)
        .into_iter()
        .take(RANKING_LIMIT)
        .map(|(name, count)| AreaRank {
            name: name.to_string(),
            count,
        })
        .collect();

    let mut newest_first = scoped.clone();
    newest_first.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then_with(|| b.id.cmp(&a.id)));
    let rows = newest_first.into_iter().filter_map(ReportRow::project).collect();

    Ok(Report {
        period: filter.period.clone(),
        window,
        team: filter.team.clone(),
        area: filter.area.clone(),
        violation_type: filter.violation_type.clone(),
        kpi,
        trend,
        distribution,
        ranking,
        rows,
    })
}

fn count_on(records: &[&AlertRecord], date: NaiveDate) -> usize {
    records.iter().filter(|a| a.occurred_at.date_naive() == date).count()
}

fn tally<'a>(names: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

// Highest count wins; ties go to the smallest name.
fn mode<'a>(counts: &BTreeMap<&'a str, usize>) -> Option<(&'a str, usize)> {
    ranked(counts).into_iter().next()
}

fn ranked<'a>(counts: &BTreeMap<&'a str, usize>) -> Vec<(&'a str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (*k, *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
