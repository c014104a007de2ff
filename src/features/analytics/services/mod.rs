pub mod aggregation;
mod analytics_service;
pub mod calendar;
pub mod filter;
pub mod history;

pub use analytics_service::AnalyticsService;
pub use calendar::Calendar;
