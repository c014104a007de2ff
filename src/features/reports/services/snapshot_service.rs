use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::core::error::{AppError, Result};
use crate::features::reports::clients::{ReportClient, ReportClientError};
use crate::features::reports::models::Report;

/// Immutable copy of the report collection from one successful fetch
#[derive(Debug, Default)]
pub struct Snapshot {
    pub reports: Vec<Report>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// 0 until the first successful fetch, then incremented per fetch
    pub version: u64,
}

struct SnapshotState {
    current: Arc<Snapshot>,
    loading: bool,
}

/// Observable state of the snapshot store
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotStatus {
    pub loading: bool,
    pub version: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub report_count: usize,
}

/// Holds the current snapshot and replaces it wholesale on refresh
pub struct SnapshotService {
    client: ReportClient,
    state: RwLock<SnapshotState>,
    /// Serializes refreshes so only one upstream request is in flight
    refresh_lock: Mutex<()>,
}

impl SnapshotService {
    /// Starts in the loading state; nothing is served until the first refresh settles
    pub fn new(client: ReportClient) -> Self {
        Self {
            client,
            state: RwLock::new(SnapshotState {
                current: Arc::new(Snapshot::default()),
                loading: true,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Snapshot to run filters and aggregations against.
    ///
    /// Fails only while the very first fetch is outstanding. A refresh on top of
    /// an existing snapshot keeps serving the old one until the new one lands,
    /// and a failed first fetch leaves an empty snapshot in place.
    pub async fn current(&self) -> Result<Arc<Snapshot>> {
        let state = self.state.read().await;
        if state.loading && state.current.version == 0 {
            return Err(AppError::ServiceUnavailable(
                "Report snapshot is still loading".to_string(),
            ));
        }
        Ok(Arc::clone(&state.current))
    }

    pub async fn status(&self) -> SnapshotStatus {
        let state = self.state.read().await;
        SnapshotStatus {
            loading: state.loading,
            version: state.current.version,
            fetched_at: state.current.fetched_at,
            report_count: state.current.reports.len(),
        }
    }

    /// Fetch the collection and swap it in.
    ///
    /// On failure the error is logged, the loading flag cleared and the
    /// last-known snapshot kept. No retry.
    pub async fn refresh(&self) -> std::result::Result<Arc<Snapshot>, ReportClientError> {
        let _guard = self.refresh_lock.lock().await;

        self.state.write().await.loading = true;

        let fetched = self.client.fetch_reports().await;

        let mut state = self.state.write().await;
        state.loading = false;

        match fetched {
            Ok(fetched) => {
                let snapshot = Arc::new(Snapshot {
                    reports: fetched.reports,
                    fetched_at: Some(fetched.fetched_at),
                    version: state.current.version + 1,
                });
                tracing::info!(
                    "Report snapshot v{} loaded ({} reports)",
                    snapshot.version,
                    snapshot.reports.len()
                );
                state.current = Arc::clone(&snapshot);
                Ok(snapshot)
            }
            Err(e) => {
                tracing::error!(
                    "Error fetching reports from {}: {}; keeping snapshot v{}",
                    self.client.reports_url(),
                    e,
                    state.current.version
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ReportSourceConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> SnapshotService {
        let client = ReportClient::new(&ReportSourceConfig {
            base_url: server.uri(),
            fetch_timeout: Duration::from_secs(5),
            refresh_interval: None,
        })
        .unwrap();
        SnapshotService::new(client)
    }

    #[tokio::test]
    async fn test_unavailable_until_first_fetch() {
        let server = MockServer::start().await;
        let service = service_for(&server);

        assert!(matches!(
            service.current().await,
            Err(AppError::ServiceUnavailable(_))
        ));
        assert!(service.status().await.loading);
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "_id": "1" }, { "_id": "2" }])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "_id": "3" }
            ])))
            .mount(&server)
            .await;

        let service = service_for(&server);

        let first = service.refresh().await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.reports.len(), 2);

        let second = service.refresh().await.unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.reports.len(), 1);

        // The earlier snapshot is untouched for anyone still holding it
        assert_eq!(first.reports.len(), 2);

        let status = service.status().await;
        assert!(!status.loading);
        assert_eq!(status.version, 2);
        assert_eq!(status.report_count, 1);
    }

    #[tokio::test]
    async fn test_fetched_at_matches_fallback_dates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "_id": "1" },
                { "_id": "2", "createdAt": "not a date" },
                { "_id": "3", "createdAt": "2024-06-15T08:30:00Z" }
            ])))
            .mount(&server)
            .await;

        let service = service_for(&server);
        let snapshot = service.refresh().await.unwrap();

        let fetched_at = snapshot.fetched_at.unwrap();
        assert_eq!(snapshot.reports[0].date, fetched_at);
        assert_eq!(snapshot.reports[1].date, fetched_at);
        assert_ne!(snapshot.reports[2].date, fetched_at);
        assert_eq!(service.status().await.fetched_at, Some(fetched_at));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "_id": "1" }
            ])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = service_for(&server);
        service.refresh().await.unwrap();
        assert!(service.refresh().await.is_err());

        let current = service.current().await.unwrap();
        assert_eq!(current.version, 1);
        assert_eq!(current.reports.len(), 1);
        assert!(!service.status().await.loading);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_serves_empty_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = service_for(&server);
        assert!(service.refresh().await.is_err());

        let current = service.current().await.unwrap();
        assert_eq!(current.version, 0);
        assert!(current.reports.is_empty());
    }
}
