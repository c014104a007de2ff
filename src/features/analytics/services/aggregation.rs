use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::features::analytics::services::calendar::{
    first_of_month, Calendar, Interval, TimeOfDay,
};
use crate::features::reports::models::{Report, ReportField};
use crate::shared::constants::{
    CHART_PALETTE, DAILY_SERIES_DAYS, HIGH_PRIORITY_VALUES, MATRIX_PRIORITIES, MATRIX_SEVERITIES,
    MONTHLY_SERIES_MONTHS, SEVERITY_CRITICAL, STATUS_ONGOING, STATUS_PENDING, STATUS_RESOLVED,
    WEEKLY_SERIES_WEEKS,
};

/// One chart slice: a distinct value and how many reports carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CountGroup {
    pub name: String,
    pub value: usize,
    pub color: String,
}

/// Distinct values in first-seen order with their counts
fn tally<'a, I>(keys: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<(&'a str, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for key in keys {
        match index.get(key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key, order.len());
                order.push((key, 1));
            }
        }
    }

    order
}

/// Group reports by the literal value of `field`.
///
/// Reports without a value are skipped. Colors come from the chart palette by
/// first-seen position, wrapping when there are more groups than colors.
pub fn count_by(reports: &[&Report], field: ReportField) -> Vec<CountGroup> {
    tally(reports.iter().filter_map(|r| r.field(field)))
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| CountGroup {
            name: name.to_string(),
            value,
            color: CHART_PALETTE[i % CHART_PALETTE.len()].to_string(),
        })
        .collect()
}

/// Group by time of day, in first-seen order, with the fixed per-bucket colors
pub fn count_by_time_of_day(reports: &[&Report], calendar: &Calendar) -> Vec<CountGroup> {
    let buckets: Vec<TimeOfDay> = reports
        .iter()
        .map(|r| calendar.time_of_day(r.date))
        .collect();

    tally(buckets.iter().map(|b| b.label()))
        .into_iter()
        .map(|(label, value)| {
            let color = TimeOfDay::ALL
                .iter()
                .find(|b| b.label() == label)
                .map(|b| b.color())
                .unwrap_or(CHART_PALETTE[0]);
            CountGroup {
                name: label.to_string(),
                value,
                color: color.to_string(),
            }
        })
        .collect()
}

/// All four time-of-day buckets in clock order, zero-filled
pub fn time_of_day_distribution(reports: &[&Report], calendar: &Calendar) -> Vec<CountGroup> {
    let mut counts = [0usize; 4];
    for report in reports {
        let bucket = calendar.time_of_day(report.date);
        if let Some(i) = TimeOfDay::ALL.iter().position(|b| *b == bucket) {
            counts[i] += 1;
        }
    }

    TimeOfDay::ALL
        .iter()
        .zip(counts)
        .map(|(bucket, value)| CountGroup {
            name: bucket.label().to_string(),
            value,
            color: bucket.color().to_string(),
        })
        .collect()
}

// ============================================================================
// Time-bucketed series
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendRange {
    Daily,
    Weekly,
    Monthly,
}

/// Counts for one calendar bucket of a trend series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    pub label: String,
    /// First local date of the bucket
    pub start_date: NaiveDate,
    pub interval: Interval,
    pub count: usize,
    /// severity = Critical
    pub critical: usize,
    /// status = Resolved
    pub resolved: usize,
    /// Weekly series only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u32>,
    /// priority in {High, Urgent}; monthly series only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_priority: Option<usize>,
}

#[derive(Default)]
struct BucketTally {
    count: usize,
    critical: usize,
    resolved: usize,
    high_priority: usize,
}

fn is_high_priority(report: &Report) -> bool {
    report
        .priority
        .as_deref()
        .is_some_and(|p| HIGH_PRIORITY_VALUES.contains(&p))
}

fn tally_interval(reports: &[&Report], interval: &Interval) -> BucketTally {
    let mut tally = BucketTally::default();
    for report in reports.iter().filter(|r| interval.contains(r.date)) {
        tally.count += 1;
        if report.severity.as_deref() == Some(SEVERITY_CRITICAL) {
            tally.critical += 1;
        }
        if report.status.as_deref() == Some(STATUS_RESOLVED) {
            tally.resolved += 1;
        }
        if is_high_priority(report) {
            tally.high_priority += 1;
        }
    }
    tally
}

/// The 7 calendar days ending today, oldest first
pub fn daily_series(
    reports: &[&Report],
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<TrendBucket> {
    let today = calendar.local_date(now);

    (0..DAILY_SERIES_DAYS)
        .rev()
        .map(|ago| {
            let day = today - Days::new(u64::from(ago));
            let interval = calendar.day(day);
            let tally = tally_interval(reports, &interval);
            TrendBucket {
                label: day.format("%a, %b %-d").to_string(),
                start_date: day,
                interval,
                count: tally.count,
                critical: tally.critical,
                resolved: tally.resolved,
                week_number: None,
                high_priority: None,
            }
        })
        .collect()
}

/// The 6 calendar weeks ending with the current one, oldest first
pub fn weekly_series(
    reports: &[&Report],
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<TrendBucket> {
    let today = calendar.local_date(now);

    (0..WEEKLY_SERIES_WEEKS)
        .rev()
        .map(|ago| {
            let week_start = calendar.week_start_date(today - Days::new(7 * u64::from(ago)));
            let interval = calendar.week(week_start);
            let week_number = calendar.week_number(week_start);
            let tally = tally_interval(reports, &interval);
            TrendBucket {
                label: format!("Week {} ({})", week_number, week_start.format("%b %-d")),
                start_date: week_start,
                interval,
                count: tally.count,
                critical: tally.critical,
                resolved: tally.resolved,
                week_number: Some(week_number),
                high_priority: None,
            }
        })
        .collect()
}

/// The 6 calendar months including the current one, oldest first
pub fn monthly_series(
    reports: &[&Report],
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<TrendBucket> {
    let this_month = first_of_month(calendar.local_date(now));

    (0..MONTHLY_SERIES_MONTHS)
        .rev()
        .filter_map(|ago| this_month.checked_sub_months(Months::new(ago)))
        .map(|month| {
            let interval = calendar.month(month);
            let tally = tally_interval(reports, &interval);
            TrendBucket {
                label: month.format("%b %Y").to_string(),
                start_date: month,
                interval,
                count: tally.count,
                critical: tally.critical,
                resolved: tally.resolved,
                week_number: None,
                high_priority: Some(tally.high_priority),
            }
        })
        .collect()
}

pub fn trend_series(
    reports: &[&Report],
    range: TrendRange,
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<TrendBucket> {
    match range {
        TrendRange::Daily => daily_series(reports, now, calendar),
        TrendRange::Weekly => weekly_series(reports, now, calendar),
        TrendRange::Monthly => monthly_series(reports, now, calendar),
    }
}

// ============================================================================
// Drill-down
// ============================================================================

/// Breakdown available when drilling into one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DrillDownMetric {
    Severity,
    Priority,
    Type,
    Status,
    Environment,
    Team,
    Time,
}

impl DrillDownMetric {
    fn field(&self) -> Option<ReportField> {
        match self {
            DrillDownMetric::Severity => Some(ReportField::Severity),
            DrillDownMetric::Priority => Some(ReportField::Priority),
            DrillDownMetric::Type => Some(ReportField::Type),
            DrillDownMetric::Status => Some(ReportField::Status),
            DrillDownMetric::Environment => Some(ReportField::Environment),
            DrillDownMetric::Team => Some(ReportField::Team),
            DrillDownMetric::Time => None,
        }
    }
}

/// Restrict to the month containing `month` and break down by `metric`
pub fn drill_down(
    reports: &[&Report],
    month: NaiveDate,
    metric: DrillDownMetric,
    calendar: &Calendar,
) -> Vec<CountGroup> {
    let window = calendar.month(month);
    let in_month: Vec<&Report> = reports
        .iter()
        .copied()
        .filter(|r| window.contains(r.date))
        .collect();

    match metric.field() {
        Some(field) => count_by(&in_month, field),
        None => count_by_time_of_day(&in_month, calendar),
    }
}

// ============================================================================
// Summary and matrix
// ============================================================================

/// Headline numbers over the filtered set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Reports matching the current filters
    pub total: usize,
    /// Reports in the snapshot before filtering
    pub snapshot_total: usize,
    pub pending: usize,
    pub ongoing: usize,
    pub resolved: usize,
    pub critical: usize,
    pub high_priority: usize,
    /// Resolved share in whole percent; `None` when nothing matches
    pub resolution_rate: Option<u32>,
}

pub fn resolution_rate(resolved: usize, total: usize) -> Option<u32> {
    if total == 0 {
        return None;
    }
    Some(((resolved as f64 / total as f64) * 100.0).round() as u32)
}

pub fn summarize(reports: &[&Report], snapshot_total: usize) -> AnalyticsSummary {
    let with_status = |status: &str| {
        reports
            .iter()
            .filter(|r| r.status.as_deref() == Some(status))
            .count()
    };
    let resolved = with_status(STATUS_RESOLVED);

    AnalyticsSummary {
        total: reports.len(),
        snapshot_total,
        pending: with_status(STATUS_PENDING),
        ongoing: with_status(STATUS_ONGOING),
        resolved,
        critical: reports
            .iter()
            .filter(|r| r.severity.as_deref() == Some(SEVERITY_CRITICAL))
            .count(),
        high_priority: reports.iter().filter(|r| is_high_priority(r)).count(),
        resolution_rate: resolution_rate(resolved, reports.len()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriorityCount {
    pub priority: String,
    pub count: usize,
}

/// One severity row of the severity x priority matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SeverityPriorityRow {
    pub severity: String,
    pub priorities: Vec<PriorityCount>,
}

pub fn severity_priority_matrix(reports: &[&Report]) -> Vec<SeverityPriorityRow> {
    MATRIX_SEVERITIES
        .iter()
        .map(|&severity| SeverityPriorityRow {
            severity: severity.to_string(),
            priorities: MATRIX_PRIORITIES
                .iter()
                .map(|&priority| PriorityCount {
                    priority: priority.to_string(),
                    count: reports
                        .iter()
                        .filter(|r| {
                            r.severity.as_deref() == Some(severity)
                                && r.priority.as_deref() == Some(priority)
                        })
                        .count(),
                })
                .collect(),
        })
        .collect()
}
