use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::device::{Device, HistoryEntry, Location, MetadataPatch};
use crate::error::DomainResult;

/// Repository trait for device storage operations.
/// Infrastructure layer (waymark-mongo) implements this trait.
///
/// All lookups key on `device_id`, never on the store's surrogate identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Insert a fully-initialized device record.
    async fn insert_device(&self, device: Device) -> DomainResult<()>;

    /// List every device record.
    async fn list_devices(&self) -> DomainResult<Vec<Device>>;

    /// Look up a device by its external identity.
    async fn get_device(&self, device_id: &str) -> DomainResult<Option<Device>>;

    /// Apply a field-whitelist metadata merge. Only fields present in the
    /// patch are written, plus `last_updated`, plus the location reset the
    /// caller mandates. `history` is never touched.
    async fn update_metadata(
        &self,
        device_id: &str,
        patch: MetadataPatch,
        last_updated: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Set the current location and `last_updated`, and append the matching
    /// history entry, as one atomic document mutation.
    async fn append_location(
        &self,
        device_id: &str,
        location: Location,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Replace the history with an empty sequence. Current location and
    /// metadata are untouched.
    async fn clear_history(&self, device_id: &str) -> DomainResult<()>;

    /// Read the full ordered history.
    async fn read_history(&self, device_id: &str) -> DomainResult<Vec<HistoryEntry>>;

    /// Delete the device record.
    async fn delete_device(&self, device_id: &str) -> DomainResult<()>;
}
