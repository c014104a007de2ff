use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::analytics::services::calendar::{
    first_of_month, Calendar, Interval, TimeOfDay,
};
use crate::features::reports::models::{Report, ReportField};

/// Named date window, anchored at the evaluation instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    #[serde(rename = "last-7-days")]
    Last7Days,
    #[serde(rename = "last-30-days")]
    Last30Days,
    #[serde(rename = "last-90-days")]
    Last90Days,
}

impl DateRange {
    pub const ALL: [DateRange; 10] = [
        DateRange::All,
        DateRange::Today,
        DateRange::Yesterday,
        DateRange::ThisWeek,
        DateRange::LastWeek,
        DateRange::ThisMonth,
        DateRange::LastMonth,
        DateRange::Last7Days,
        DateRange::Last30Days,
        DateRange::Last90Days,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::ThisWeek => "this-week",
            DateRange::LastWeek => "last-week",
            DateRange::ThisMonth => "this-month",
            DateRange::LastMonth => "last-month",
            DateRange::Last7Days => "last-7-days",
            DateRange::Last30Days => "last-30-days",
            DateRange::Last90Days => "last-90-days",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::All => "All Time",
            DateRange::Today => "Today",
            DateRange::Yesterday => "Yesterday",
            DateRange::ThisWeek => "This Week",
            DateRange::LastWeek => "Last Week",
            DateRange::ThisMonth => "This Month",
            DateRange::LastMonth => "Last Month",
            DateRange::Last7Days => "Last 7 Days",
            DateRange::Last30Days => "Last 30 Days",
            DateRange::Last90Days => "Last 90 Days",
        }
    }

    /// Concrete window for this range at `now`; `None` means unconstrained
    pub fn interval(&self, now: DateTime<Utc>, calendar: &Calendar) -> Option<Interval> {
        let today = calendar.local_date(now);
        let trailing = |days: u64| Interval {
            start: calendar.days_before(now, days),
            end: now,
        };

        match self {
            DateRange::All => None,
            DateRange::Today => Some(calendar.day(today)),
            DateRange::Yesterday => Some(calendar.day(today - Days::new(1))),
            DateRange::ThisWeek => Some(calendar.week(today)),
            DateRange::LastWeek => Some(calendar.week(today - Days::new(7))),
            DateRange::ThisMonth => Some(calendar.month(today)),
            DateRange::LastMonth => first_of_month(today)
                .checked_sub_months(Months::new(1))
                .map(|previous| calendar.month(previous)),
            DateRange::Last7Days => Some(trailing(7)),
            DateRange::Last30Days => Some(trailing(30)),
            DateRange::Last90Days => Some(trailing(90)),
        }
    }
}

/// Time-of-day selector; `All` disables the constraint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDayFilter {
    #[default]
    All,
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDayFilter {
    pub fn bucket(&self) -> Option<TimeOfDay> {
        match self {
            TimeOfDayFilter::All => None,
            TimeOfDayFilter::Morning => Some(TimeOfDay::Morning),
            TimeOfDayFilter::Afternoon => Some(TimeOfDay::Afternoon),
            TimeOfDayFilter::Evening => Some(TimeOfDay::Evening),
            TimeOfDayFilter::Night => Some(TimeOfDay::Night),
        }
    }
}

/// User-selected constraints; an empty string means "any value"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub status: String,
    pub severity: String,
    pub priority: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub date_range: DateRange,
    pub search: String,
    pub assignee: String,
    pub reporter: String,
    pub team: String,
    pub environment: String,
    pub resolution: String,
}

/// Complete filter state: field criteria plus the separately tracked time-of-day selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub criteria: FilterCriteria,
    pub time_of_day: TimeOfDayFilter,
}

impl FilterState {
    /// Back to "everything, all time, any hour"
    pub fn clear(&mut self) {
        *self = FilterState::default();
    }
}

fn matches_exact(criterion: &str, value: Option<&str>) -> bool {
    criterion.is_empty() || value == Some(criterion)
}

fn matches_substring(criterion: &str, value: Option<&str>) -> bool {
    criterion.is_empty() || value.is_some_and(|v| v.contains(criterion))
}

/// Filter state resolved against a fixed instant, ready to test reports
pub struct ReportPredicate<'a> {
    criteria: &'a FilterCriteria,
    search_lower: String,
    window: Option<Interval>,
    time_of_day: Option<TimeOfDay>,
    calendar: &'a Calendar,
}

impl<'a> ReportPredicate<'a> {
    pub fn new(state: &'a FilterState, now: DateTime<Utc>, calendar: &'a Calendar) -> Self {
        Self {
            criteria: &state.criteria,
            search_lower: state.criteria.search.to_lowercase(),
            window: state.criteria.date_range.interval(now, calendar),
            time_of_day: state.time_of_day.bucket(),
            calendar,
        }
    }

    fn matches_search(&self, report: &Report) -> bool {
        let search = &self.criteria.search;
        if search.is_empty() {
            return true;
        }
        let lower_contains = |text: &Option<String>| {
            text.as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&self.search_lower))
        };
        lower_contains(&report.title)
            || lower_contains(&report.description)
            || report.id.as_deref().is_some_and(|id| id.contains(search.as_str()))
    }

    pub fn matches(&self, report: &Report) -> bool {
        let c = self.criteria;

        matches_exact(&c.status, report.field(ReportField::Status))
            && matches_exact(&c.severity, report.field(ReportField::Severity))
            && matches_exact(&c.priority, report.field(ReportField::Priority))
            && matches_exact(&c.report_type, report.field(ReportField::Type))
            && matches_exact(&c.team, report.field(ReportField::Team))
            && matches_exact(&c.environment, report.field(ReportField::Environment))
            && matches_exact(&c.resolution, report.field(ReportField::Resolution))
            && matches_substring(&c.assignee, report.field(ReportField::Assignee))
            && matches_substring(&c.reporter, report.field(ReportField::Reporter))
            && self.matches_search(report)
            && self.window.map_or(true, |w| w.contains(report.date))
            && self
                .time_of_day
                .map_or(true, |bucket| self.calendar.time_of_day(report.date) == bucket)
    }
}

/// Reports satisfying every active constraint, in input order
pub fn filter_reports<'a>(
    reports: &'a [Report],
    state: &FilterState,
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<&'a Report> {
    let predicate = ReportPredicate::new(state, now, calendar);
    reports.iter().filter(|r| predicate.matches(r)).collect()
}
