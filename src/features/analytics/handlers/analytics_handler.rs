use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::analytics::dtos::*;
use crate::features::analytics::services::aggregation::{
    AnalyticsSummary, CountGroup, SeverityPriorityRow, TrendBucket,
};
use crate::features::analytics::services::filter::FilterState;
use crate::features::analytics::services::AnalyticsService;
use crate::features::reports::models::Report;
use crate::shared::types::{ApiResponse, Meta};

fn filter_state(query: AnalyticsFilterQuery) -> Result<FilterState> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(query.into_state())
}

// ============================================================================
// Reports
// ============================================================================

/// List reports matching the filters
#[utoipa::path(
    get,
    path = "/api/analytics/reports",
    tag = "Analytics",
    params(AnalyticsFilterQuery),
    responses(
        (status = 200, description = "Filtered reports", body = ApiResponse<Vec<Report>>),
        (status = 400, description = "Invalid filter parameters"),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn list_reports(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(query): AppQuery<AnalyticsFilterQuery>,
) -> Result<Json<ApiResponse<Vec<Report>>>> {
    let reports = service.list_reports(&filter_state(query)?).await?;
    let total = reports.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

// ============================================================================
// Aggregates
// ============================================================================

/// Headline counts over the filtered reports
#[utoipa::path(
    get,
    path = "/api/analytics/summary",
    tag = "Analytics",
    params(AnalyticsFilterQuery),
    responses(
        (status = 200, description = "Summary", body = ApiResponse<AnalyticsSummary>),
        (status = 400, description = "Invalid filter parameters"),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn get_summary(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(query): AppQuery<AnalyticsFilterQuery>,
) -> Result<Json<ApiResponse<AnalyticsSummary>>> {
    let summary = service.get_summary(&filter_state(query)?).await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Group the filtered reports by one field
#[utoipa::path(
    get,
    path = "/api/analytics/counts",
    tag = "Analytics",
    params(CountsQuery, AnalyticsFilterQuery),
    responses(
        (status = 200, description = "Grouped counts in first-seen order", body = ApiResponse<Vec<CountGroup>>),
        (status = 400, description = "Missing or unknown field"),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn get_counts(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(params): AppQuery<CountsQuery>,
    AppQuery(query): AppQuery<AnalyticsFilterQuery>,
) -> Result<Json<ApiResponse<Vec<CountGroup>>>> {
    let groups = service
        .get_counts(&filter_state(query)?, params.field)
        .await?;
    Ok(Json(ApiResponse::success(Some(groups), None, None)))
}

/// Daily, weekly or monthly series ending at the current period
#[utoipa::path(
    get,
    path = "/api/analytics/trends",
    tag = "Analytics",
    params(TrendsQuery, AnalyticsFilterQuery),
    responses(
        (status = 200, description = "Trend buckets, oldest first", body = ApiResponse<Vec<TrendBucket>>),
        (status = 400, description = "Missing or unknown range"),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn get_trends(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(params): AppQuery<TrendsQuery>,
    AppQuery(query): AppQuery<AnalyticsFilterQuery>,
) -> Result<Json<ApiResponse<Vec<TrendBucket>>>> {
    let series = service
        .get_trends(&filter_state(query)?, params.range)
        .await?;
    Ok(Json(ApiResponse::success(Some(series), None, None)))
}

/// Counts for all four time-of-day buckets
#[utoipa::path(
    get,
    path = "/api/analytics/time-of-day",
    tag = "Analytics",
    params(AnalyticsFilterQuery),
    responses(
        (status = 200, description = "Morning, afternoon, evening and night counts", body = ApiResponse<Vec<CountGroup>>),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn get_time_of_day(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(query): AppQuery<AnalyticsFilterQuery>,
) -> Result<Json<ApiResponse<Vec<CountGroup>>>> {
    let distribution = service.get_time_of_day(&filter_state(query)?).await?;
    Ok(Json(ApiResponse::success(Some(distribution), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/severity-priority",
    tag = "Analytics",
    params(AnalyticsFilterQuery),
    responses(
        (status = 200, description = "Severity x priority matrix", body = ApiResponse<Vec<SeverityPriorityRow>>),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn get_severity_priority(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(query): AppQuery<AnalyticsFilterQuery>,
) -> Result<Json<ApiResponse<Vec<SeverityPriorityRow>>>> {
    let matrix = service.get_severity_priority(&filter_state(query)?).await?;
    Ok(Json(ApiResponse::success(Some(matrix), None, None)))
}

/// Break one month of filtered reports down by a metric
#[utoipa::path(
    get,
    path = "/api/analytics/drill-down",
    tag = "Analytics",
    params(DrillDownQuery, AnalyticsFilterQuery),
    responses(
        (status = 200, description = "Grouped counts for the month", body = ApiResponse<Vec<CountGroup>>),
        (status = 400, description = "Invalid month or metric"),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn get_drill_down(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(params): AppQuery<DrillDownQuery>,
    AppQuery(query): AppQuery<AnalyticsFilterQuery>,
) -> Result<Json<ApiResponse<Vec<CountGroup>>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let month = params.month_start()?;

    let groups = service
        .get_drill_down(&filter_state(query)?, month, params.metric)
        .await?;
    Ok(Json(ApiResponse::success(Some(groups), None, None)))
}

// ============================================================================
// History
// ============================================================================

/// Resolved reports for a set of departments, most severe first
#[utoipa::path(
    get,
    path = "/api/analytics/history",
    tag = "Analytics",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Resolved reports", body = ApiResponse<Vec<Report>>),
        (status = 503, description = "Report snapshot is still loading")
    )
)]
pub async fn get_history(
    State(service): State<Arc<AnalyticsService>>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<Report>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let reports = service
        .get_history(&query.department_list(), query.search_text())
        .await?;
    let total = reports.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

// ============================================================================
// Options and snapshot
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/analytics/filter-options",
    tag = "Analytics",
    responses(
        (status = 200, description = "Static filter option lists", body = ApiResponse<FilterOptionsDto>)
    )
)]
pub async fn get_filter_options(
    State(service): State<Arc<AnalyticsService>>,
) -> Json<ApiResponse<FilterOptionsDto>> {
    Json(ApiResponse::success(
        Some(service.get_filter_options()),
        None,
        None,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/snapshot",
    tag = "Analytics",
    responses(
        (status = 200, description = "Snapshot store state", body = ApiResponse<SnapshotStatusDto>)
    )
)]
pub async fn get_snapshot_status(
    State(service): State<Arc<AnalyticsService>>,
) -> Json<ApiResponse<SnapshotStatusDto>> {
    Json(ApiResponse::success(
        Some(service.get_snapshot_status().await),
        None,
        None,
    ))
}

/// Re-fetch the report collection and replace the snapshot
#[utoipa::path(
    post,
    path = "/api/analytics/snapshot/refresh",
    tag = "Analytics",
    responses(
        (status = 200, description = "Snapshot replaced", body = ApiResponse<SnapshotStatusDto>),
        (status = 502, description = "Upstream fetch failed; previous snapshot kept")
    )
)]
pub async fn refresh_snapshot(
    State(service): State<Arc<AnalyticsService>>,
) -> Result<Json<ApiResponse<SnapshotStatusDto>>> {
    let status = service.refresh_snapshot().await?;
    Ok(Json(ApiResponse::success(
        Some(status),
        Some("Snapshot refreshed".to_string()),
        None,
    )))
}
