use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::device::{Device, Location, MetadataPatch, RegisterDeviceInput};
use crate::error::{DomainError, DomainResult};
use crate::fabric::TopicFabric;
use crate::repository::DeviceRepository;

/// Orchestrator for the device <-> route lifecycle.
///
/// A route must never exist for a device_id with no device record and vice
/// versa. There is no transaction spanning the document store and the fabric,
/// so this service's ordering and compensation are the only enforcement:
///
/// - register: insert record, then create route; if route creation fails the
///   freshly inserted record is deleted again (compensating action) before
///   the error is surfaced.
/// - deregister: delete record, then delete route; an already-absent route is
///   treated as success, and a transport failure deleting the route is
///   tolerated with a warning (a route with no record receives no messages).
pub struct DeviceService {
    repository: Arc<dyn DeviceRepository>,
    fabric: Arc<dyn TopicFabric>,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn DeviceRepository>, fabric: Arc<dyn TopicFabric>) -> Self {
        Self { repository, fabric }
    }

    /// Register a device and create its route.
    pub async fn register_device(&self, input: RegisterDeviceInput) -> DomainResult<Device> {
        if input.device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }
        if input.name.is_empty() {
            return Err(DomainError::InvalidDeviceName(
                "Device name cannot be empty".to_string(),
            ));
        }

        if self.repository.get_device(&input.device_id).await?.is_some() {
            return Err(DomainError::DeviceAlreadyExists(input.device_id));
        }

        let device = Device {
            device_id: input.device_id,
            name: input.name,
            device_type: input.device_type,
            status: input.status,
            battery_level: input.battery_level,
            last_updated: Utc::now(),
            location: Location::default(),
            history: Vec::new(),
        };

        debug!(device_id = %device.device_id, "Registering device");
        self.repository.insert_device(device.clone()).await?;

        if let Err(route_err) = self.fabric.create_route(&device.device_id).await {
            warn!(
                device_id = %device.device_id,
                error = %route_err,
                "Route creation failed, removing the just-inserted record"
            );
            if let Err(cleanup_err) = self.repository.delete_device(&device.device_id).await {
                error!(
                    device_id = %device.device_id,
                    error = %cleanup_err,
                    "Compensating delete failed, orphan record left behind"
                );
                return Err(DomainError::RegistrationIncomplete {
                    device_id: device.device_id,
                    source: anyhow::anyhow!(cleanup_err),
                });
            }
            return Err(route_err);
        }

        info!(device_id = %device.device_id, "Device registered");
        Ok(device)
    }

    /// Delete a device record and its route.
    pub async fn deregister_device(&self, device_id: &str) -> DomainResult<()> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        debug!(device_id = %device_id, "Deregistering device");
        self.repository.delete_device(device_id).await?;

        match self.fabric.delete_route(device_id).await {
            Ok(()) => {}
            Err(DomainError::RouteNotFound(_)) => {
                debug!(device_id = %device_id, "Route already absent");
            }
            Err(e) => {
                // The record is already gone; failing the whole deregistration
                // here would leave nothing to retry against. The leftover
                // route receives no messages.
                warn!(
                    device_id = %device_id,
                    error = %e,
                    "Record deleted but route deletion failed, orphan route left behind"
                );
            }
        }

        info!(device_id = %device_id, "Device deregistered");
        Ok(())
    }

    /// Apply a metadata patch. Never touches the route or the history.
    ///
    /// Resets `location` to its zero value as a side effect of any metadata
    /// update. Inherited behavior, kept deliberately; see DESIGN.md.
    pub async fn update_metadata(&self, device_id: &str, patch: MetadataPatch) -> DomainResult<()> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        debug!(device_id = %device_id, "Updating device metadata");
        self.repository
            .update_metadata(device_id, patch, Utc::now())
            .await?;

        info!(device_id = %device_id, "Device metadata updated");
        Ok(())
    }

    pub async fn get_device(&self, device_id: &str) -> DomainResult<Device> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        self.repository
            .get_device(device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))
    }

    pub async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        let devices = self.repository.list_devices().await?;
        debug!(count = devices.len(), "Listed devices");
        Ok(devices)
    }
}
