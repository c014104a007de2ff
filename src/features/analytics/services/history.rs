use crate::features::analytics::services::calendar::Calendar;
use crate::features::reports::models::Report;
use crate::shared::constants::{severity_rank, STATUS_RESOLVED};

fn in_departments(report: &Report, departments: &[String]) -> bool {
    if departments.is_empty() {
        return true;
    }
    let Some(department) = report.department.as_deref() else {
        return false;
    };
    let department = department.trim().to_lowercase();
    departments
        .iter()
        .any(|wanted| wanted.trim().to_lowercase() == department)
}

fn matches_search(report: &Report, search: &str, calendar: &Calendar) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();

    let text_hit = [
        &report.report_type,
        &report.status,
        &report.location_name,
        &report.priority,
        &report.severity,
    ]
    .iter()
    .any(|value| {
        value
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    });

    // Dates are matched as typed against M/D/YYYY
    text_hit
        || report.created_at.is_some_and(|created| {
            calendar
                .local_date(created)
                .format("%-m/%-d/%Y")
                .to_string()
                .contains(search)
        })
}

/// Resolved reports for the given departments, most severe first.
///
/// An empty department list means every department. The sort is stable so
/// reports of equal severity keep their snapshot order.
pub fn history<'a>(
    reports: &'a [Report],
    departments: &[String],
    search: &str,
    calendar: &Calendar,
) -> Vec<&'a Report> {
    let mut resolved: Vec<&Report> = reports
        .iter()
        .filter(|r| in_departments(r, departments))
        .filter(|r| r.status.as_deref() == Some(STATUS_RESOLVED))
        .filter(|r| matches_search(r, search, calendar))
        .collect();

    resolved.sort_by_key(|r| severity_rank(r.severity.as_deref()));
    resolved
}
