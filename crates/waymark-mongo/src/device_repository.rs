use std::future::{Future, IntoFuture};
use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use tracing::debug;

use waymark_domain::{
    Device, DeviceRepository, DomainError, DomainResult, HistoryEntry, Location, MetadataPatch,
};

use crate::client::MongoClient;
use crate::models::DeviceDocument;

const COLLECTION: &str = "devices";

// MongoDB duplicate-key write error.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB implementation of the DeviceRepository trait.
///
/// Every operation is a single document mutation keyed on `deviceId` and
/// bounded by `op_timeout`; timeout expiry is a transport failure, never a
/// retry.
#[derive(Clone)]
pub struct MongoDeviceRepository {
    collection: Collection<DeviceDocument>,
    op_timeout: Duration,
}

impl MongoDeviceRepository {
    pub fn new(client: &MongoClient, op_timeout: Duration) -> Self {
        Self {
            collection: client.database().collection(COLLECTION),
            op_timeout,
        }
    }

    /// Declare the unique index on `deviceId`. This is what makes duplicate
    /// inserts surface as write error 11000; without it two racing inserts
    /// would both land. Idempotent, run on every startup.
    pub async fn ensure_indexes(&self) -> DomainResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "deviceId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.bounded(
            "createIndex",
            self.collection.create_index(index).into_future(),
        )
        .await?;

        debug!("Ensured unique deviceId index");
        Ok(())
    }

    fn filter(device_id: &str) -> Document {
        doc! { "deviceId": device_id }
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> DomainResult<T>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                DomainError::Transport(
                    anyhow::Error::new(e).context(format!("Device store {} failed", op)),
                )
            }),
            Err(_) => Err(DomainError::Transport(anyhow::anyhow!(
                "Device store {} timed out after {:?}",
                op,
                self.op_timeout
            ))),
        }
    }
}

fn is_duplicate_key(err: &DomainError) -> bool {
    let DomainError::Transport(source) = err else {
        return false;
    };
    source
        .downcast_ref::<mongodb::error::Error>()
        .is_some_and(|e| {
            matches!(
                *e.kind,
                ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == DUPLICATE_KEY_CODE
            )
        })
}

#[async_trait]
impl DeviceRepository for MongoDeviceRepository {
    async fn insert_device(&self, device: Device) -> DomainResult<()> {
        let document = DeviceDocument::from(&device);
        let result = self
            .bounded("insertOne", self.collection.insert_one(document).into_future())
            .await;

        match result {
            Ok(_) => {
                debug!(device_id = %device.device_id, "Inserted device record");
                Ok(())
            }
            Err(e) if is_duplicate_key(&e) => {
                Err(DomainError::DeviceAlreadyExists(device.device_id))
            }
            Err(e) => Err(e),
        }
    }

    async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        let cursor = self.bounded("find", self.collection.find(doc! {}).into_future()).await?;

        let documents: Vec<DeviceDocument> = self
            .bounded("find cursor drain", cursor.try_collect())
            .await?;

        debug!(count = documents.len(), "Listed device records");
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn get_device(&self, device_id: &str) -> DomainResult<Option<Device>> {
        let document = self
            .bounded("findOne", self.collection.find_one(Self::filter(device_id)).into_future())
            .await?;

        Ok(document.map(Into::into))
    }

    async fn update_metadata(
        &self,
        device_id: &str,
        patch: MetadataPatch,
        last_updated: DateTime<Utc>,
    ) -> DomainResult<()> {
        // Field-whitelist merge: only present patch fields are written, plus
        // lastUpdated and the location reset. The history array is never part
        // of this update.
        let mut set = doc! {
            "lastUpdated": bson::DateTime::from_chrono(last_updated),
            "location": { "lat": 0.0, "lng": 0.0 },
        };
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(device_type) = patch.device_type {
            set.insert("type", device_type);
        }
        if let Some(status) = patch.status {
            set.insert("status", status);
        }
        if let Some(battery_level) = patch.battery_level {
            set.insert("batteryLevel", battery_level);
        }

        let result = self
            .bounded(
                "updateOne",
                self.collection
                    .update_one(Self::filter(device_id), doc! { "$set": set })
                    .into_future(),
            )
            .await?;

        if result.matched_count == 0 {
            return Err(DomainError::DeviceNotFound(device_id.to_string()));
        }

        debug!(device_id = %device_id, "Updated device metadata");
        Ok(())
    }

    async fn append_location(
        &self,
        device_id: &str,
        location: Location,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()> {
        let stamp = bson::DateTime::from_chrono(timestamp);
        // One combined $set + $push so no reader ever sees the current
        // location updated without its history entry, or the reverse.
        let update = doc! {
            "$set": {
                "location": { "lat": location.lat, "lng": location.lng },
                "lastUpdated": stamp,
            },
            "$push": {
                "history": {
                    "timestamp": stamp,
                    "location": { "lat": location.lat, "lng": location.lng },
                },
            },
        };

        let result = self
            .bounded(
                "updateOne",
                self.collection
                    .update_one(Self::filter(device_id), update)
                    .into_future(),
            )
            .await?;

        if result.matched_count == 0 {
            return Err(DomainError::DeviceNotFound(device_id.to_string()));
        }

        debug!(device_id = %device_id, "Appended location");
        Ok(())
    }

    async fn clear_history(&self, device_id: &str) -> DomainResult<()> {
        let update = doc! { "$set": { "history": [] } };

        let result = self
            .bounded(
                "updateOne",
                self.collection
                    .update_one(Self::filter(device_id), update)
                    .into_future(),
            )
            .await?;

        if result.matched_count == 0 {
            return Err(DomainError::DeviceNotFound(device_id.to_string()));
        }

        debug!(device_id = %device_id, "Cleared location history");
        Ok(())
    }

    async fn read_history(&self, device_id: &str) -> DomainResult<Vec<HistoryEntry>> {
        let document = self
            .bounded("findOne", self.collection.find_one(Self::filter(device_id)).into_future())
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))?;

        Ok(document.history.into_iter().map(Into::into).collect())
    }

    async fn delete_device(&self, device_id: &str) -> DomainResult<()> {
        let result = self
            .bounded(
                "deleteOne",
                self.collection
                    .delete_one(Self::filter(device_id))
                    .into_future(),
            )
            .await?;

        if result.deleted_count == 0 {
            return Err(DomainError::DeviceNotFound(device_id.to_string()));
        }

        debug!(device_id = %device_id, "Deleted device record");
        Ok(())
    }
}
