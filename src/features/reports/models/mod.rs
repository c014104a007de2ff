mod report;

pub use report::{RawReport, Report, ReportField};
