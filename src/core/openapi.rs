use utoipa::{Modify, OpenApi};

use crate::features::analytics::services::{aggregation, calendar, filter};
use crate::features::analytics::{dtos as analytics_dtos, handlers as analytics_handlers};
use crate::features::reports::models as reports_models;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Filtered views
        analytics_handlers::analytics_handler::list_reports,
        analytics_handlers::analytics_handler::get_summary,
        analytics_handlers::analytics_handler::get_counts,
        analytics_handlers::analytics_handler::get_trends,
        analytics_handlers::analytics_handler::get_time_of_day,
        analytics_handlers::analytics_handler::get_severity_priority,
        analytics_handlers::analytics_handler::get_drill_down,
        // History and options
        analytics_handlers::analytics_handler::get_history,
        analytics_handlers::analytics_handler::get_filter_options,
        // Snapshot
        analytics_handlers::analytics_handler::get_snapshot_status,
        analytics_handlers::analytics_handler::refresh_snapshot,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Reports
            reports_models::Report,
            reports_models::ReportField,
            // Filters
            filter::DateRange,
            filter::TimeOfDayFilter,
            calendar::TimeOfDay,
            calendar::Interval,
            // Aggregates
            aggregation::CountGroup,
            aggregation::TrendRange,
            aggregation::TrendBucket,
            aggregation::DrillDownMetric,
            aggregation::AnalyticsSummary,
            aggregation::PriorityCount,
            aggregation::SeverityPriorityRow,
            // Options and snapshot
            analytics_dtos::OptionDto,
            analytics_dtos::TimeOfDayOptionDto,
            analytics_dtos::FilterOptionsDto,
            analytics_dtos::SnapshotStatusDto,
            ApiResponse<Vec<reports_models::Report>>,
            ApiResponse<aggregation::AnalyticsSummary>,
            ApiResponse<Vec<aggregation::CountGroup>>,
            ApiResponse<Vec<aggregation::TrendBucket>>,
            ApiResponse<Vec<aggregation::SeverityPriorityRow>>,
            ApiResponse<analytics_dtos::FilterOptionsDto>,
            ApiResponse<analytics_dtos::SnapshotStatusDto>,
        )
    ),
    tags(
        (name = "Analytics", description = "Filtered views and aggregates over the report snapshot"),
    ),
    info(
        title = "Incident Analytics API",
        version = "0.1.0",
        description = "Read-only analytics over an externally owned incident report collection",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_analytics_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        assert!(paths.contains(&"/api/analytics/summary".to_string()));
        assert!(paths.contains(&"/api/analytics/drill-down".to_string()));
        assert!(paths.contains(&"/api/analytics/snapshot/refresh".to_string()));
        assert_eq!(paths.len(), 11);
    }

    #[test]
    fn test_info_modifier_overrides_info() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Ops Analytics".to_string(),
            version: "2.1.0".to_string(),
            description: "Internal".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Ops Analytics");
        assert_eq!(doc.info.version, "2.1.0");
        assert_eq!(doc.info.description.as_deref(), Some("Internal"));
    }
}
