//! Background refresh of the device snapshot.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{error, info};

use floormap::directory::DeviceDirectory;
use floormap::feed::SheetFetcher;
use floormap::locator::Locator;

/// Latest located devices plus refresh bookkeeping
#[derive(Default)]
pub struct Snapshot {
    pub directory: DeviceDirectory,
    pub last_refresh: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Fetch the feed once and locate every device
pub async fn refresh(fetcher: &SheetFetcher, locator: &Locator) -> Result<DeviceDirectory> {
    let rows = fetcher.fetch().await?;
    Ok(DeviceDirectory::new(locator.locate_rows(&rows)))
}

/// Refresh `snapshot` on every tick until the task is dropped.
///
/// A failed refresh keeps the previous devices and records the error.
pub async fn run(
    fetcher: SheetFetcher,
    locator: Arc<Locator>,
    snapshot: Arc<RwLock<Snapshot>>,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let result = refresh(&fetcher, &locator).await;
        apply(&mut *snapshot.write().await, result);
    }
}

/// Fold one refresh result into the snapshot.
///
/// A failed refresh keeps the previous devices and refresh time.
pub fn apply(snap: &mut Snapshot, result: Result<DeviceDirectory>) {
    match result {
        Ok(directory) => {
            info!("Refreshed snapshot with {} devices", directory.len());
            snap.directory = directory;
            snap.last_refresh = Some(Utc::now());
            snap.last_error = None;
        }
        Err(e) => {
            error!("Failed to fetch or process device feed: {:#}", e);
            snap.last_error = Some(format!("Error loading data: {:#}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use floormap::models::{GeoPoint, LocatedDevice, PixelPoint};

    fn directory(names: &[&str]) -> DeviceDirectory {
        DeviceDirectory::new(
            names
                .iter()
                .map(|name| LocatedDevice {
                    name: name.to_string(),
                    timestamp: String::new(),
                    building: "B1".to_string(),
                    location: GeoPoint::new(14.2637, 120.9199),
                    position: PixelPoint::new(1.0, 2.0),
                    matched: true,
                })
                .collect(),
        )
    }

    #[test]
    fn test_success_replaces_devices() {
        let mut snap = Snapshot {
            last_error: Some("Error loading data: timeout".to_string()),
            ..Snapshot::default()
        };

        apply(&mut snap, Ok(directory(&["Press 1", "Lathe"])));

        assert_eq!(snap.directory.len(), 2);
        assert!(snap.last_refresh.is_some());
        assert!(snap.last_error.is_none());
    }

    #[test]
    fn test_failure_keeps_previous_snapshot() {
        let mut snap = Snapshot::default();
        apply(&mut snap, Ok(directory(&["Press 1"])));
        let refreshed_at = snap.last_refresh;

        let failed: Result<DeviceDirectory> = Err(anyhow::anyhow!("connection refused"))
            .context("Device feed request failed");
        apply(&mut snap, failed);

        assert_eq!(snap.directory.len(), 1);
        assert_eq!(snap.directory.devices()[0].name, "Press 1");
        assert_eq!(snap.last_refresh, refreshed_at);
        assert_eq!(
            snap.last_error.as_deref(),
            Some("Error loading data: Device feed request failed: connection refused")
        );
    }
}
