use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::AppError;
use crate::features::analytics::services::aggregation::{DrillDownMetric, TrendRange};
use crate::features::analytics::services::calendar::TimeOfDay;
use crate::features::analytics::services::filter::{
    DateRange, FilterCriteria, FilterState, TimeOfDayFilter,
};
use crate::features::reports::models::ReportField;
use crate::features::reports::services::SnapshotStatus;
use crate::shared::constants::{
    ENVIRONMENT_OPTIONS, FILTER_STATUS_OPTIONS, PRIORITY_OPTIONS, RESOLUTION_OPTIONS,
    SEVERITY_OPTIONS, TYPE_OPTIONS, WORKFLOW_STATUS_OPTIONS,
};
use crate::shared::validation::MONTH_REGEX;

// =============================================================================
// FILTER QUERY
// =============================================================================

/// Blank query values mean "not set", the same as an absent parameter
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            let value: serde::de::value::StrDeserializer<'_, D::Error> =
                raw.trim().into_deserializer();
            T::deserialize(value).map(Some)
        }
        _ => Ok(None),
    }
}

/// Filter criteria shared by every analytics endpoint.
///
/// Absent or empty parameters leave that dimension unconstrained.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsFilterQuery {
    /// Exact status match
    #[validate(length(max = 100))]
    pub status: Option<String>,
    /// Exact severity match
    #[validate(length(max = 100))]
    pub severity: Option<String>,
    /// Exact priority match
    #[validate(length(max = 100))]
    pub priority: Option<String>,
    /// Exact type match
    #[serde(rename = "type")]
    #[validate(length(max = 100))]
    pub report_type: Option<String>,
    /// Named date window (default: all)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date_range: Option<DateRange>,
    /// Case-insensitive search in title and description, or part of the id
    #[validate(length(max = 200))]
    pub search: Option<String>,
    /// Substring of the assignee
    #[validate(length(max = 100))]
    pub assignee: Option<String>,
    /// Substring of the reporter
    #[validate(length(max = 100))]
    pub reporter: Option<String>,
    #[validate(length(max = 100))]
    pub team: Option<String>,
    #[validate(length(max = 100))]
    pub environment: Option<String>,
    #[validate(length(max = 100))]
    pub resolution: Option<String>,
    /// Local time-of-day bucket (default: all)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub time_of_day: Option<TimeOfDayFilter>,
}

impl AnalyticsFilterQuery {
    pub fn into_state(self) -> FilterState {
        FilterState {
            criteria: FilterCriteria {
                status: self.status.unwrap_or_default(),
                severity: self.severity.unwrap_or_default(),
                priority: self.priority.unwrap_or_default(),
                report_type: self.report_type.unwrap_or_default(),
                date_range: self.date_range.unwrap_or_default(),
                search: self.search.unwrap_or_default(),
                assignee: self.assignee.unwrap_or_default(),
                reporter: self.reporter.unwrap_or_default(),
                team: self.team.unwrap_or_default(),
                environment: self.environment.unwrap_or_default(),
                resolution: self.resolution.unwrap_or_default(),
            },
            time_of_day: self.time_of_day.unwrap_or_default(),
        }
    }
}

// =============================================================================
// ENDPOINT QUERIES
// =============================================================================

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountsQuery {
    /// Report field to group by
    pub field: ReportField,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendsQuery {
    /// Series granularity
    pub range: TrendRange,
}

#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct DrillDownQuery {
    /// Month to drill into (YYYY-MM)
    #[validate(regex(path = *MONTH_REGEX, message = "month must be in YYYY-MM format"))]
    #[param(example = "2024-06")]
    pub month: String,
    /// Breakdown to compute
    pub metric: DrillDownMetric,
}

impl DrillDownQuery {
    /// First day of the requested month
    pub fn month_start(&self) -> Result<NaiveDate, AppError> {
        NaiveDate::parse_from_str(&format!("{}-01", self.month), "%Y-%m-%d")
            .map_err(|e| AppError::Validation(format!("Invalid month '{}': {}", self.month, e)))
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Comma-separated department names; empty means all departments
    #[validate(length(max = 1000))]
    pub departments: Option<String>,
    /// Search in type, status, location, priority, severity or M/D/YYYY date
    #[validate(length(max = 200))]
    pub search: Option<String>,
}

impl HistoryQuery {
    pub fn department_list(&self) -> Vec<String> {
        self.departments
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn search_text(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// A selectable value with its display label
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OptionDto {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimeOfDayOptionDto {
    pub value: String,
    pub label: String,
    /// Local hour span, e.g. "6am-12pm"
    pub hours: Option<String>,
}

/// Static option lists offered by the dashboard filters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FilterOptionsDto {
    /// Status values offered by the analytics filter
    pub statuses: Vec<String>,
    /// Status lifecycle used by the summary and history views
    pub workflow_statuses: Vec<String>,
    pub severities: Vec<String>,
    pub priorities: Vec<String>,
    pub types: Vec<String>,
    pub environments: Vec<String>,
    pub resolutions: Vec<String>,
    pub date_ranges: Vec<OptionDto>,
    pub times_of_day: Vec<TimeOfDayOptionDto>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl FilterOptionsDto {
    pub fn build() -> Self {
        let mut times_of_day = vec![TimeOfDayOptionDto {
            value: "all".to_string(),
            label: "All Times".to_string(),
            hours: None,
        }];
        times_of_day.extend(TimeOfDay::ALL.iter().map(|bucket| TimeOfDayOptionDto {
            value: bucket.label().to_lowercase(),
            label: bucket.label().to_string(),
            hours: Some(bucket.hours().to_string()),
        }));

        Self {
            statuses: owned(&FILTER_STATUS_OPTIONS),
            workflow_statuses: owned(&WORKFLOW_STATUS_OPTIONS),
            severities: owned(&SEVERITY_OPTIONS),
            priorities: owned(&PRIORITY_OPTIONS),
            types: owned(&TYPE_OPTIONS),
            environments: owned(&ENVIRONMENT_OPTIONS),
            resolutions: owned(&RESOLUTION_OPTIONS),
            date_ranges: DateRange::ALL
                .iter()
                .map(|range| OptionDto {
                    value: range.value().to_string(),
                    label: range.label().to_string(),
                })
                .collect(),
            times_of_day,
        }
    }
}

/// Snapshot store state
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnapshotStatusDto {
    /// True while a fetch is in flight
    pub loading: bool,
    /// 0 until the first successful fetch
    pub version: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub report_count: usize,
}

impl From<SnapshotStatus> for SnapshotStatusDto {
    fn from(status: SnapshotStatus) -> Self {
        Self {
            loading: status.loading,
            version: status.version,
            fetched_at: status.fetched_at,
            report_count: status.report_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    #[test]
    fn test_filter_query_into_state() {
        let uri: Uri = "/?status=Resolved&type=Bug&date_range=last-7-days&time_of_day=night&search="
            .parse()
            .unwrap();
        let Query(query) = Query::<AnalyticsFilterQuery>::try_from_uri(&uri).unwrap();
        let state = query.into_state();

        assert_eq!(state.criteria.status, "Resolved");
        assert_eq!(state.criteria.report_type, "Bug");
        assert_eq!(state.criteria.date_range, DateRange::Last7Days);
        assert_eq!(state.criteria.search, "");
        assert_eq!(state.criteria.team, "");
        assert_eq!(state.time_of_day, TimeOfDayFilter::Night);
    }

    #[test]
    fn test_blank_enum_params_are_unset() {
        let uri: Uri = "/?date_range=&time_of_day=%20".parse().unwrap();
        let Query(query) = Query::<AnalyticsFilterQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.date_range, None);
        assert_eq!(query.time_of_day, None);
        assert_eq!(query.into_state(), FilterState::default());

        let uri: Uri = "/?date_range=fortnight".parse().unwrap();
        assert!(Query::<AnalyticsFilterQuery>::try_from_uri(&uri).is_err());
    }

    #[test]
    fn test_empty_query_is_unconstrained() {
        let state = AnalyticsFilterQuery::default().into_state();
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn test_drill_down_month_validation() {
        let valid = DrillDownQuery {
            month: "2024-06".to_string(),
            metric: DrillDownMetric::Severity,
        };
        assert!(valid.validate().is_ok());
        assert_eq!(
            valid.month_start().unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );

        let invalid = DrillDownQuery {
            month: "2024-6".to_string(),
            metric: DrillDownMetric::Time,
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_history_department_list() {
        let query = HistoryQuery {
            departments: Some(" Ops, ,Public Works ,".to_string()),
            search: None,
        };
        assert_eq!(query.department_list(), vec!["Ops", "Public Works"]);
        assert_eq!(query.search_text(), "");

        assert!(HistoryQuery::default().department_list().is_empty());
    }

    #[test]
    fn test_filter_options() {
        let options = FilterOptionsDto::build();
        assert_eq!(options.statuses.len(), 6);
        assert_eq!(options.workflow_statuses, vec!["Pending", "Ongoing", "Resolved"]);
        assert_eq!(options.date_ranges.len(), 10);
        assert_eq!(options.date_ranges[7].value, "last-7-days");
        let values: Vec<_> = options.times_of_day.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["all", "morning", "afternoon", "evening", "night"]);
    }
}
