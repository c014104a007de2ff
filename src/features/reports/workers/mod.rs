mod snapshot_refresher;

pub use snapshot_refresher::SnapshotRefresher;
