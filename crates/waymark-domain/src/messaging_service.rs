use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{DomainError, DomainResult};
use crate::fabric::TopicFabric;

/// Dispatcher for ad-hoc operator messages to a device's route.
///
/// No device-existence check is performed before publishing: a routing key
/// with no bound queue drops the message at the broker without error. That is
/// the inherited contract; see DESIGN.md.
pub struct MessagingService {
    fabric: Arc<dyn TopicFabric>,
}

impl MessagingService {
    pub fn new(fabric: Arc<dyn TopicFabric>) -> Self {
        Self { fabric }
    }

    pub async fn send_message(&self, device_id: &str, content: &str) -> DomainResult<()> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        debug!(device_id = %device_id, size_bytes = content.len(), "Publishing message");
        self.fabric.publish(device_id, content.as_bytes()).await?;

        info!(device_id = %device_id, "Message published");
        Ok(())
    }
}
