use async_trait::async_trait;

use crate::error::DomainResult;

/// Abstraction over the pub/sub broker topology. Infrastructure layer
/// (waymark-amqp) implements this trait; services only ever see routes keyed
/// by device identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicFabric: Send + Sync {
    /// Declare the delivery queue for `device_id` and bind it to the shared
    /// topic exchange with `device_id` as the routing key. Idempotent for
    /// identical parameters.
    async fn create_route(&self, device_id: &str) -> DomainResult<()>;

    /// Remove the delivery queue for `device_id`. An already-absent route is
    /// reported as `DomainError::RouteNotFound`, distinct from transport
    /// failures, so callers can choose idempotent-delete semantics.
    async fn delete_route(&self, device_id: &str) -> DomainResult<()>;

    /// Publish `payload` to the shared exchange with `device_id` as the
    /// routing key. Fire-and-forget: no delivery confirmation, a routing key
    /// with no bound queue drops the message at the broker.
    async fn publish(&self, device_id: &str, payload: &[u8]) -> DomainResult<()>;
}
