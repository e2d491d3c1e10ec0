use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::device::{HistoryEntry, Location};
use crate::error::{DomainError, DomainResult};
use crate::repository::DeviceRepository;

/// Append/clear/read semantics for a device's location timeline.
///
/// An append sets the current location and pushes the matching history entry
/// in one repository call, so readers never observe one without the other.
pub struct LocationService {
    repository: Arc<dyn DeviceRepository>,
}

impl LocationService {
    pub fn new(repository: Arc<dyn DeviceRepository>) -> Self {
        Self { repository }
    }

    /// Record a location fix: set current location, bump `last_updated`, and
    /// append the history entry, all stamped with the same timestamp.
    pub async fn record_location(&self, device_id: &str, location: Location) -> DomainResult<()> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        let timestamp = Utc::now();
        debug!(device_id = %device_id, lat = location.lat, lng = location.lng, "Recording location");

        self.repository
            .append_location(device_id, location, timestamp)
            .await?;

        info!(device_id = %device_id, "Location recorded");
        Ok(())
    }

    /// Wipe the history. Current location and metadata stay as they are.
    pub async fn clear_history(&self, device_id: &str) -> DomainResult<()> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        self.repository.clear_history(device_id).await?;

        info!(device_id = %device_id, "Location history cleared");
        Ok(())
    }

    /// Full ordered history. Unbounded; there is no pagination.
    pub async fn read_history(&self, device_id: &str) -> DomainResult<Vec<HistoryEntry>> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        let history = self.repository.read_history(device_id).await?;
        debug!(device_id = %device_id, entries = history.len(), "Read location history");
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockDeviceRepository;

    #[tokio::test]
    async fn test_record_location_stamps_append() {
        let mut mock_repo = MockDeviceRepository::new();
        mock_repo
            .expect_append_location()
            .withf(|id, location, _ts| {
                id == "TEST-001" && location.lat == 12.9 && location.lng == 77.6
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = LocationService::new(Arc::new(mock_repo));

        let location = Location { lat: 12.9, lng: 77.6 };
        assert!(service.record_location("TEST-001", location).await.is_ok());
    }

    #[tokio::test]
    async fn test_record_location_empty_device_id() {
        let service = LocationService::new(Arc::new(MockDeviceRepository::new()));

        let result = service
            .record_location("", Location { lat: 1.0, lng: 2.0 })
            .await;
        assert!(matches!(result, Err(DomainError::InvalidDeviceId(_))));
    }

    #[tokio::test]
    async fn test_read_history_unknown_device() {
        let mut mock_repo = MockDeviceRepository::new();
        mock_repo
            .expect_read_history()
            .times(1)
            .returning(|id| Err(DomainError::DeviceNotFound(id.to_string())));

        let service = LocationService::new(Arc::new(mock_repo));

        let result = service.read_history("missing").await;
        assert!(matches!(result, Err(DomainError::DeviceNotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_history_delegates() {
        let mut mock_repo = MockDeviceRepository::new();
        mock_repo
            .expect_clear_history()
            .withf(|id| id == "TEST-001")
            .times(1)
            .returning(|_| Ok(()));

        let service = LocationService::new(Arc::new(mock_repo));

        assert!(service.clear_history("TEST-001").await.is_ok());
    }
}
