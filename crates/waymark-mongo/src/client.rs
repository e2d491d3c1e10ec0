use anyhow::{Context, Result};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::info;

use crate::config::MongoConfig;

/// Shared MongoDB client. The driver keeps its own connection pool, so one
/// clone-able handle serves every request worker.
#[derive(Clone)]
pub struct MongoClient {
    database: Database,
}

impl MongoClient {
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        info!(url = %config.url, database = %config.database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(&config.url)
            .await
            .context("Failed to parse MongoDB connection string")?;
        options.connect_timeout = Some(config.op_timeout);
        options.server_selection_timeout = Some(config.op_timeout);

        let client = Client::with_options(options).context("Failed to create MongoDB client")?;
        let database = client.database(&config.database);

        info!("MongoDB client ready");
        Ok(Self { database })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}
