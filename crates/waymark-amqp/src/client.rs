use anyhow::{Context, Result};
use lapin::options::ExchangeDeclareOptions;
use lapin::protocol::constants::REPLY_SUCCESS;
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, ExchangeKind};
use tracing::{info, warn};

use crate::config::AmqpConfig;

/// Name of the shared topic exchange. Fixed external contract; device
/// consumers bind against it by this name.
pub const DEVICE_EXCHANGE: &str = "device_exchange";

/// Process-wide AMQP connection plus the one shared channel all route and
/// publish operations go through. Built once at startup, closed once at
/// shutdown.
pub struct AmqpClient {
    connection: Connection,
    channel: Channel,
}

impl AmqpClient {
    /// Dial the broker with a bounded retry budget, then declare the shared
    /// durable topic exchange. Redeclaring on restart is safe; the declare is
    /// idempotent for identical parameters.
    pub async fn connect(config: &AmqpConfig) -> Result<Self> {
        let connection = Self::dial(config).await?;

        let channel = connection
            .create_channel()
            .await
            .context("Failed to open AMQP channel")?;

        channel
            .exchange_declare(
                DEVICE_EXCHANGE,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("Failed to declare device exchange")?;

        info!(exchange = DEVICE_EXCHANGE, "AMQP client ready");
        Ok(Self {
            connection,
            channel,
        })
    }

    async fn dial(config: &AmqpConfig) -> Result<Connection> {
        // A zero budget would mean no dial at all; always make at least one
        // attempt.
        let max_attempts = config.max_connect_attempts.max(1);
        let mut attempt = 1;

        loop {
            match Connection::connect(&config.url, ConnectionProperties::default()).await {
                Ok(connection) => {
                    info!(attempt, "Connected to AMQP broker");
                    return Ok(connection);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Failed to connect to AMQP broker"
                    );
                    if attempt >= max_attempts {
                        return Err(anyhow::Error::new(e).context(format!(
                            "Could not connect to AMQP broker after {} attempts",
                            max_attempts
                        )));
                    }
                    attempt += 1;
                    tokio::time::sleep(config.connect_retry_delay).await;
                }
            }
        }
    }

    /// The shared channel. lapin channels are internally synchronized, so
    /// clones of this handle are safe for concurrent request workers.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Close channel and connection. Safe to call more than once; a
    /// no-longer-connected handle is left alone.
    pub async fn close(&self) {
        if !self.connection.status().connected() {
            return;
        }
        if let Err(e) = self.connection.close(REPLY_SUCCESS, "shutdown").await {
            warn!(error = %e, "Error closing AMQP connection");
        } else {
            info!("AMQP connection closed");
        }
    }
}
