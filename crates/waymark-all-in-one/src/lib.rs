pub mod config;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use waymark_amqp::{AmqpClient, AmqpConfig, AmqpTopicFabric};
use waymark_domain::{DeviceService, LocationService, MessagingService};
use waymark_mongo::{MongoClient, MongoConfig, MongoDeviceRepository};

use crate::config::ServiceConfig;

/// The wired-up domain services. The HTTP layer (external to this workspace)
/// consumes these; nothing below them is reachable any other way.
pub struct Services {
    pub devices: Arc<DeviceService>,
    pub locations: Arc<LocationService>,
    pub messaging: Arc<MessagingService>,
}

/// Connect the store and the broker and build the service graph.
///
/// The returned `AmqpClient` owns the process-wide connection; the caller
/// must `close()` it exactly once at shutdown.
pub async fn bootstrap(config: &ServiceConfig) -> Result<(AmqpClient, Services)> {
    info!("Initializing MongoDB...");
    let mongo_config = MongoConfig {
        url: config.mongo_url.clone(),
        database: config.mongo_database.clone(),
        op_timeout: Duration::from_secs(config.store_op_timeout_secs),
    };
    let mongo_client = MongoClient::connect(&mongo_config)
        .await
        .context("Failed to initialize MongoDB client")?;
    let repository = Arc::new(MongoDeviceRepository::new(
        &mongo_client,
        mongo_config.op_timeout,
    ));
    repository
        .ensure_indexes()
        .await
        .context("Failed to ensure device store indexes")?;

    info!("Initializing AMQP...");
    let amqp_config = AmqpConfig {
        url: config.amqp_url.clone(),
        max_connect_attempts: config.amqp_max_connect_attempts,
        connect_retry_delay: Duration::from_secs(config.amqp_connect_retry_delay_secs),
    };
    let amqp_client = AmqpClient::connect(&amqp_config)
        .await
        .context("Failed to initialize AMQP client")?;
    let fabric = Arc::new(AmqpTopicFabric::new(&amqp_client));

    let services = Services {
        devices: Arc::new(DeviceService::new(repository.clone(), fabric.clone())),
        locations: Arc::new(LocationService::new(repository)),
        messaging: Arc::new(MessagingService::new(fabric)),
    };

    Ok((amqp_client, services))
}
