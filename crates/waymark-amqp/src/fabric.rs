use async_trait::async_trait;
use lapin::options::{
    BasicPublishOptions, QueueBindOptions, QueueDeclareOptions, QueueDeleteOptions,
};
use lapin::protocol::{AMQPErrorKind, AMQPSoftError};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel};
use tracing::debug;

use waymark_domain::{DomainError, DomainResult, TopicFabric};

use crate::client::{AmqpClient, DEVICE_EXCHANGE};

/// AMQP implementation of the TopicFabric trait. One queue per device, named
/// after and bound with the device id on the shared topic exchange.
#[derive(Clone)]
pub struct AmqpTopicFabric {
    channel: Channel,
}

impl AmqpTopicFabric {
    pub fn new(client: &AmqpClient) -> Self {
        Self {
            channel: client.channel().clone(),
        }
    }
}

/// A broker NOT_FOUND reply is a distinct condition; everything else on the
/// wire is a transport failure.
fn map_route_error(device_id: &str, err: lapin::Error, op: &str) -> DomainError {
    if let lapin::Error::ProtocolError(ref amqp_err) = err {
        if matches!(
            amqp_err.kind(),
            AMQPErrorKind::Soft(AMQPSoftError::NOTFOUND)
        ) {
            return DomainError::RouteNotFound(device_id.to_string());
        }
    }
    DomainError::Transport(
        anyhow::Error::new(err).context(format!("Fabric {} failed for {}", op, device_id)),
    )
}

#[async_trait]
impl TopicFabric for AmqpTopicFabric {
    async fn create_route(&self, device_id: &str) -> DomainResult<()> {
        // Non-durable, not auto-deleted: the queue survives consumer churn
        // but not a broker restart. Redeclaring with identical parameters is
        // a no-op at the broker.
        self.channel
            .queue_declare(
                device_id,
                QueueDeclareOptions {
                    durable: false,
                    auto_delete: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| map_route_error(device_id, e, "queue declare"))?;

        self.channel
            .queue_bind(
                device_id,
                DEVICE_EXCHANGE,
                device_id,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| map_route_error(device_id, e, "queue bind"))?;

        debug!(device_id = %device_id, "Route created");
        Ok(())
    }

    async fn delete_route(&self, device_id: &str) -> DomainResult<()> {
        self.channel
            .queue_delete(device_id, QueueDeleteOptions::default())
            .await
            .map_err(|e| map_route_error(device_id, e, "queue delete"))?;

        debug!(device_id = %device_id, "Route deleted");
        Ok(())
    }

    async fn publish(&self, device_id: &str, payload: &[u8]) -> DomainResult<()> {
        // Fire-and-forget: the returned publisher confirm is not awaited.
        self.channel
            .basic_publish(
                DEVICE_EXCHANGE,
                device_id,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type("text/plain".into()),
            )
            .await
            .map_err(|e| map_route_error(device_id, e, "publish"))?;

        debug!(device_id = %device_id, size_bytes = payload.len(), "Message published");
        Ok(())
    }
}
