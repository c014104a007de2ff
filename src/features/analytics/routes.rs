use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::analytics::handlers;
use crate::features::analytics::services::AnalyticsService;

/// Create analytics routes
pub fn routes(analytics_service: Arc<AnalyticsService>) -> Router {
    Router::new()
        // Filtered views
        .route("/api/analytics/reports", get(handlers::list_reports))
        .route("/api/analytics/summary", get(handlers::get_summary))
        .route("/api/analytics/counts", get(handlers::get_counts))
        .route("/api/analytics/trends", get(handlers::get_trends))
        .route("/api/analytics/time-of-day", get(handlers::get_time_of_day))
        .route(
            "/api/analytics/severity-priority",
            get(handlers::get_severity_priority),
        )
        .route("/api/analytics/drill-down", get(handlers::get_drill_down))
        // History and options
        .route("/api/analytics/history", get(handlers::get_history))
        .route(
            "/api/analytics/filter-options",
            get(handlers::get_filter_options),
        )
        // Snapshot
        .route("/api/analytics/snapshot", get(handlers::get_snapshot_status))
        .route(
            "/api/analytics/snapshot/refresh",
            post(handlers::refresh_snapshot),
        )
        .with_state(analytics_service)
}
