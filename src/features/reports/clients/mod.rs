mod report_client;

pub use report_client::{FetchedReports, ReportClient, ReportClientError};
