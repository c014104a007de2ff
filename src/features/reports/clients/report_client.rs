use chrono::{DateTime, Utc};

use crate::core::config::ReportSourceConfig;
use crate::features::reports::models::{RawReport, Report};

#[derive(Debug, thiserror::Error)]
pub enum ReportClientError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Report request failed: {0}")]
    Request(String),

    #[error("Report store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse report collection: {0}")]
    Parse(String),
}

/// One fetched collection and the clock reading it was dated with
#[derive(Debug)]
pub struct FetchedReports {
    pub reports: Vec<Report>,
    /// Also the `date` of every report without a readable `createdAt`
    pub fetched_at: DateTime<Utc>,
}

/// Reads the full report collection from the upstream REST backend
pub struct ReportClient {
    client: reqwest::Client,
    reports_url: String,
}

impl ReportClient {
    pub fn new(config: &ReportSourceConfig) -> Result<Self, ReportClientError> {
        let client = reqwest::Client::builder()
            .user_agent("IncidentAnalytics/0.1 (report-snapshot)")
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| ReportClientError::Client(e.to_string()))?;

        Ok(Self {
            client,
            reports_url: format!("{}/reports", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn reports_url(&self) -> &str {
        &self.reports_url
    }

    /// `GET {base}/reports`; the store has no paging, so this is the whole collection
    pub async fn fetch_reports(&self) -> Result<FetchedReports, ReportClientError> {
        tracing::debug!("Fetching report collection from {}", self.reports_url);

        let response = self
            .client
            .get(&self.reports_url)
            .send()
            .await
            .map_err(|e| ReportClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportClientError::Status { status, body });
        }

        let documents: Vec<RawReport> = response
            .json()
            .await
            .map_err(|e| ReportClientError::Parse(e.to_string()))?;

        // One clock reading for the whole batch
        let fetched_at = Utc::now();
        let reports: Vec<Report> = documents
            .into_iter()
            .map(|doc| doc.into_report(fetched_at))
            .collect();

        tracing::info!("Fetched {} reports from {}", reports.len(), self.reports_url);

        Ok(FetchedReports {
            reports,
            fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> ReportSourceConfig {
        ReportSourceConfig {
            base_url: base_url.to_string(),
            fetch_timeout: Duration::from_secs(5),
            refresh_interval: None,
        }
    }

    #[test]
    fn test_reports_url_joins_base() {
        let client = ReportClient::new(&test_config("http://localhost:4000/api/")).unwrap();
        assert_eq!(client.reports_url(), "http://localhost:4000/api/reports");
    }

    #[tokio::test]
    async fn test_fetch_reports_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "_id": "a1",
                    "type": "Fire",
                    "status": "Pending",
                    "severity": "Critical",
                    "priority": "Urgent",
                    "department": "Fire",
                    "locationName": "Warehouse 4",
                    "createdAt": "2024-06-15T08:30:00.000Z"
                },
                { "_id": "a2", "type": "Flood", "status": "Resolved" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReportClient::new(&test_config(&server.uri())).unwrap();
        let FetchedReports {
            reports,
            fetched_at,
        } = client.fetch_reports().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id.as_deref(), Some("a1"));
        assert_eq!(reports[0].location_name.as_deref(), Some("Warehouse 4"));
        assert!(reports[0].created_at.is_some());
        // No createdAt: dated at fetch time
        assert_eq!(reports[1].created_at, None);
        assert_eq!(reports[1].date, fetched_at);
    }

    #[tokio::test]
    async fn test_fetch_reports_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
            .mount(&server)
            .await;

        let client = ReportClient::new(&test_config(&server.uri())).unwrap();
        let err = client.fetch_reports().await.unwrap_err();

        match err {
            ReportClientError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "database down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reports": []
            })))
            .mount(&server)
            .await;

        let client = ReportClient::new(&test_config(&server.uri())).unwrap();
        let err = client.fetch_reports().await.unwrap_err();
        assert!(matches!(err, ReportClientError::Parse(_)));
    }
}
