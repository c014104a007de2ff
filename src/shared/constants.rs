// =============================================================================
// CHART COLORS
// =============================================================================

/// Palette for grouped counts, indexed by first-seen order of the group key
pub const CHART_PALETTE: [&str; 10] = [
    "#6366f1", "#22c55e", "#3b82f6", "#eab308", "#ef4444", "#6b7280", "#fbbf24", "#34d399",
    "#8b5cf6", "#ec4899",
];

pub const COLOR_MORNING: &str = "#fbbf24";
pub const COLOR_AFTERNOON: &str = "#f59e0b";
pub const COLOR_EVENING: &str = "#d97706";
pub const COLOR_NIGHT: &str = "#4f46e5";

// =============================================================================
// FIELD VALUES
// =============================================================================

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_ONGOING: &str = "Ongoing";
pub const STATUS_RESOLVED: &str = "Resolved";

pub const SEVERITY_CRITICAL: &str = "Critical";

/// Priorities counted as "high priority" in summaries and the monthly series
pub const HIGH_PRIORITY_VALUES: [&str; 2] = ["High", "Urgent"];

// =============================================================================
// VOCABULARIES
// =============================================================================
//
// The analytics filter and the summary/history views were built against
// different status sets. Both are kept as-is until product reconciles them.

/// Status options offered by the analytics filter
pub const FILTER_STATUS_OPTIONS: [&str; 6] = [
    "Open",
    "In Progress",
    "Resolved",
    "Closed",
    "Reopened",
    "Pending",
];

/// Status lifecycle used by the summary cards and the history view
pub const WORKFLOW_STATUS_OPTIONS: [&str; 3] = [STATUS_PENDING, STATUS_ONGOING, STATUS_RESOLVED];

pub const SEVERITY_OPTIONS: [&str; 5] = ["Low", "Medium", "High", "Critical", "Blocker"];

pub const PRIORITY_OPTIONS: [&str; 5] = ["Low", "Medium", "High", "Urgent", "Immediate"];

pub const TYPE_OPTIONS: [&str; 6] = [
    "Bug",
    "Feature",
    "Enhancement",
    "Support",
    "Task",
    "Documentation",
];

pub const ENVIRONMENT_OPTIONS: [&str; 5] = ["Development", "Staging", "Production", "Test", "UAT"];

pub const RESOLUTION_OPTIONS: [&str; 6] = [
    "Fixed",
    "Won't Fix",
    "Duplicate",
    "Cannot Reproduce",
    "Done",
    "Implemented",
];

/// Rows of the severity x priority matrix, most severe first
pub const MATRIX_SEVERITIES: [&str; 4] = ["Critical", "High", "Medium", "Low"];

/// Columns of the severity x priority matrix
pub const MATRIX_PRIORITIES: [&str; 4] = ["High", "Urgent", "Medium", "Low"];

/// Sort rank of a severity in the history view; unknown values sort last
pub fn severity_rank(severity: Option<&str>) -> u8 {
    match severity {
        Some("Critical") => 1,
        Some("High") => 2,
        Some("Medium") => 3,
        Some("Low") => 4,
        _ => 5,
    }
}

// =============================================================================
// SERIES LENGTHS
// =============================================================================

pub const DAILY_SERIES_DAYS: u32 = 7;
pub const WEEKLY_SERIES_WEEKS: u32 = 6;
pub const MONTHLY_SERIES_MONTHS: u32 = 6;
