pub mod clients;
pub mod models;
pub mod services;
pub mod workers;

pub use clients::ReportClient;
pub use services::SnapshotService;
pub use workers::SnapshotRefresher;
