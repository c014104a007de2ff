use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::features::reports::services::SnapshotService;

/// Background worker that re-fetches the report snapshot on a fixed period
pub struct SnapshotRefresher {
    snapshot_service: Arc<SnapshotService>,
    period: Duration,
}

impl SnapshotRefresher {
    pub fn new(snapshot_service: Arc<SnapshotService>, period: Duration) -> Self {
        Self {
            snapshot_service,
            period,
        }
    }

    /// Run the refresher in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting snapshot refresher (every {}s)",
            self.period.as_secs()
        );

        let mut interval = interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // First tick fires immediately; startup already did the initial fetch
        interval.tick().await;

        loop {
            interval.tick().await;

            // Failures are logged by the service and the old snapshot stays
            let _ = self.snapshot_service.refresh().await;
        }
    }
}
