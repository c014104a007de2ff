use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::analytics::dtos::{FilterOptionsDto, SnapshotStatusDto};
use crate::features::analytics::services::aggregation::{
    self, AnalyticsSummary, CountGroup, DrillDownMetric, SeverityPriorityRow, TrendBucket,
    TrendRange,
};
use crate::features::analytics::services::calendar::Calendar;
use crate::features::analytics::services::filter::{filter_reports, FilterState};
use crate::features::analytics::services::history;
use crate::features::reports::models::{Report, ReportField};
use crate::features::reports::services::SnapshotService;

/// Runs the filter and aggregation passes against the current snapshot.
///
/// Every call re-derives its result from the whole snapshot; nothing is cached.
pub struct AnalyticsService {
    snapshot_service: Arc<SnapshotService>,
    calendar: Calendar,
}

impl AnalyticsService {
    pub fn new(snapshot_service: Arc<SnapshotService>, calendar: Calendar) -> Self {
        Self {
            snapshot_service,
            calendar,
        }
    }

    /// Filter the current snapshot and hand the matches to `f`.
    ///
    /// The snapshot `Arc` is cloned out of the store first, so no lock is held
    /// while `f` runs.
    async fn with_filtered<R>(
        &self,
        state: &FilterState,
        f: impl FnOnce(&[&Report], usize, DateTime<Utc>) -> R,
    ) -> Result<R> {
        let snapshot = self.snapshot_service.current().await?;
        let now = Utc::now();
        let filtered = filter_reports(&snapshot.reports, state, now, &self.calendar);
        Ok(f(&filtered, snapshot.reports.len(), now))
    }

    pub async fn list_reports(&self, state: &FilterState) -> Result<Vec<Report>> {
        self.with_filtered(state, |reports, _, _| {
            reports.iter().map(|r| (*r).clone()).collect()
        })
        .await
    }

    pub async fn get_summary(&self, state: &FilterState) -> Result<AnalyticsSummary> {
        self.with_filtered(state, |reports, snapshot_total, _| {
            aggregation::summarize(reports, snapshot_total)
        })
        .await
    }

    pub async fn get_counts(
        &self,
        state: &FilterState,
        field: ReportField,
    ) -> Result<Vec<CountGroup>> {
        self.with_filtered(state, |reports, _, _| aggregation::count_by(reports, field))
            .await
    }

    pub async fn get_trends(
        &self,
        state: &FilterState,
        range: TrendRange,
    ) -> Result<Vec<TrendBucket>> {
        let calendar = self.calendar;
        self.with_filtered(state, |reports, _, now| {
            aggregation::trend_series(reports, range, now, &calendar)
        })
        .await
    }

    pub async fn get_time_of_day(&self, state: &FilterState) -> Result<Vec<CountGroup>> {
        let calendar = self.calendar;
        self.with_filtered(state, |reports, _, _| {
            aggregation::time_of_day_distribution(reports, &calendar)
        })
        .await
    }

    pub async fn get_severity_priority(
        &self,
        state: &FilterState,
    ) -> Result<Vec<SeverityPriorityRow>> {
        self.with_filtered(state, |reports, _, _| {
            aggregation::severity_priority_matrix(reports)
        })
        .await
    }

    pub async fn get_drill_down(
        &self,
        state: &FilterState,
        month: NaiveDate,
        metric: DrillDownMetric,
    ) -> Result<Vec<CountGroup>> {
        let calendar = self.calendar;
        self.with_filtered(state, |reports, _, _| {
            aggregation::drill_down(reports, month, metric, &calendar)
        })
        .await
    }

    /// Resolved reports for the given departments; ignores the analytics filters
    pub async fn get_history(&self, departments: &[String], search: &str) -> Result<Vec<Report>> {
        let snapshot = self.snapshot_service.current().await?;
        Ok(
            history::history(&snapshot.reports, departments, search, &self.calendar)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    pub fn get_filter_options(&self) -> FilterOptionsDto {
        FilterOptionsDto::build()
    }

    pub async fn get_snapshot_status(&self) -> SnapshotStatusDto {
        self.snapshot_service.status().await.into()
    }

    /// Re-fetch the snapshot; upstream failures surface as 502
    pub async fn refresh_snapshot(&self) -> Result<SnapshotStatusDto> {
        self.snapshot_service.refresh().await?;
        Ok(self.get_snapshot_status().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ReportSourceConfig;
    use crate::core::error::AppError;
    use crate::features::analytics::services::filter::TimeOfDayFilter;
    use crate::features::reports::clients::ReportClient;
    use chrono::{TimeDelta, Weekday};
    use chrono_tz::Tz;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_with(body: serde_json::Value) -> (MockServer, AnalyticsService) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = ReportClient::new(&ReportSourceConfig {
            base_url: server.uri(),
            fetch_timeout: Duration::from_secs(5),
            refresh_interval: None,
        })
        .unwrap();
        let snapshots = Arc::new(SnapshotService::new(client));
        let service = AnalyticsService::new(
            Arc::clone(&snapshots),
            Calendar::new(Tz::UTC, Weekday::Sun),
        );
        (server, service)
    }

    fn recent(hours_ago: i64) -> String {
        (Utc::now() - TimeDelta::hours(hours_ago)).to_rfc3339()
    }

    #[tokio::test]
    async fn test_unavailable_before_first_fetch() {
        let (_server, service) = service_with(serde_json::json!([])).await;

        let result = service.get_summary(&FilterState::default()).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
        assert!(service.get_snapshot_status().await.loading);
    }

    #[tokio::test]
    async fn test_summary_over_filtered_snapshot() {
        let (_server, service) = service_with(serde_json::json!([
            { "_id": "1", "status": "Resolved", "severity": "Critical", "createdAt": recent(1) },
            { "_id": "2", "status": "Pending", "priority": "Urgent", "createdAt": recent(2) },
            { "_id": "3", "status": "Resolved", "createdAt": recent(3) },
        ]))
        .await;
        service.refresh_snapshot().await.unwrap();

        let summary = service.get_summary(&FilterState::default()).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.high_priority, 1);
        assert_eq!(summary.resolution_rate, Some(67));

        let mut state = FilterState::default();
        state.criteria.status = "Pending".to_string();
        let summary = service.get_summary(&state).await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.snapshot_total, 3);
        assert_eq!(summary.resolution_rate, Some(0));
    }

    #[tokio::test]
    async fn test_empty_filter_result_has_no_rate() {
        let (_server, service) =
            service_with(serde_json::json!([{ "_id": "1", "status": "Open" }])).await;
        service.refresh_snapshot().await.unwrap();

        let mut state = FilterState::default();
        state.criteria.severity = "Blocker".to_string();
        let summary = service.get_summary(&state).await.unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.resolution_rate, None);
        assert!(service.list_reports(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_time_of_day_and_counts() {
        let (_server, service) = service_with(serde_json::json!([
            { "_id": "1", "team": "Core", "createdAt": "2024-06-03T08:00:00Z" },
            { "_id": "2", "team": "Core", "createdAt": "2024-06-03T22:00:00Z" },
            { "_id": "3", "team": "Web", "createdAt": "2024-06-03T13:00:00Z" },
        ]))
        .await;
        service.refresh_snapshot().await.unwrap();

        let mut state = FilterState::default();
        state.time_of_day = TimeOfDayFilter::Night;
        let counts = service.get_counts(&state, ReportField::Team).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].name, "Core");
        assert_eq!(counts[0].value, 1);

        let distribution = service
            .get_time_of_day(&FilterState::default())
            .await
            .unwrap();
        let values: Vec<_> = distribution.iter().map(|g| g.value).collect();
        assert_eq!(values, vec![1, 1, 0, 1]);
    }

    #[tokio::test]
    async fn test_history_ignores_analytics_filters() {
        let (_server, service) = service_with(serde_json::json!([
            { "_id": "1", "status": "Resolved", "department": "Ops", "severity": "Low" },
            { "_id": "2", "status": "Resolved", "department": "ops", "severity": "Critical" },
            { "_id": "3", "status": "Pending", "department": "Ops" },
        ]))
        .await;
        service.refresh_snapshot().await.unwrap();

        let history = service
            .get_history(&["OPS".to_string()], "")
            .await
            .unwrap();
        let ids: Vec<_> = history.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_refresh_failure_maps_to_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let client = ReportClient::new(&ReportSourceConfig {
            base_url: server.uri(),
            fetch_timeout: Duration::from_secs(5),
            refresh_interval: None,
        })
        .unwrap();
        let service = AnalyticsService::new(
            Arc::new(SnapshotService::new(client)),
            Calendar::new(Tz::UTC, Weekday::Sun),
        );

        let result = service.refresh_snapshot().await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));

        // The failed first fetch settles the store with an empty snapshot
        let status = service.get_snapshot_status().await;
        assert!(!status.loading);
        assert_eq!(status.version, 0);
        assert!(service
            .list_reports(&FilterState::default())
            .await
            .unwrap()
            .is_empty());
    }
}
