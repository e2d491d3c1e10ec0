#![cfg(feature = "integration-tests")]

//! Integration tests against a live MongoDB instance.
//!
//! Run with:
//!   WAYMARK_TEST_MONGO_URL=mongodb://localhost:27017 \
//!   cargo test -p waymark-mongo --features integration-tests

use std::time::Duration;

use chrono::Utc;
use waymark_domain::{Device, DeviceRepository, DomainError, Location};
use waymark_mongo::{MongoClient, MongoConfig, MongoDeviceRepository};

async fn test_repository(database: &str) -> MongoDeviceRepository {
    let url = std::env::var("WAYMARK_TEST_MONGO_URL")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let config = MongoConfig {
        url,
        database: database.to_string(),
        op_timeout: Duration::from_secs(5),
    };
    let client = MongoClient::connect(&config).await.unwrap();
    let repo = MongoDeviceRepository::new(&client, config.op_timeout);
    repo.ensure_indexes().await.unwrap();
    repo
}

fn test_device(device_id: &str) -> Device {
    Device {
        device_id: device_id.to_string(),
        name: "Integration Device".to_string(),
        device_type: "tracker".to_string(),
        status: "active".to_string(),
        battery_level: 90,
        last_updated: Utc::now(),
        location: Location::default(),
        history: Vec::new(),
    }
}

#[tokio::test]
async fn insert_get_delete_round_trip() {
    let repo = test_repository("waymark_it_lifecycle").await;
    let device_id = format!("IT-{}", Utc::now().timestamp_nanos_opt().unwrap());

    repo.insert_device(test_device(&device_id)).await.unwrap();

    let fetched = repo.get_device(&device_id).await.unwrap().unwrap();
    assert_eq!(fetched.device_id, device_id);
    assert!(fetched.history.is_empty());

    repo.delete_device(&device_id).await.unwrap();
    assert!(repo.get_device(&device_id).await.unwrap().is_none());

    let second_delete = repo.delete_device(&device_id).await;
    assert!(matches!(second_delete, Err(DomainError::DeviceNotFound(_))));
}

#[tokio::test]
async fn duplicate_device_id_insert_is_rejected() {
    let repo = test_repository("waymark_it_unique").await;
    let device_id = format!("IT-{}", Utc::now().timestamp_nanos_opt().unwrap());

    repo.insert_device(test_device(&device_id)).await.unwrap();

    // The unique deviceId index turns the second insert into a duplicate-key
    // write error, even though no pre-check ran.
    let second = repo.insert_device(test_device(&device_id)).await;
    assert!(matches!(second, Err(DomainError::DeviceAlreadyExists(_))));

    repo.delete_device(&device_id).await.unwrap();
}

#[tokio::test]
async fn append_location_sets_current_and_pushes_history() {
    let repo = test_repository("waymark_it_history").await;
    let device_id = format!("IT-{}", Utc::now().timestamp_nanos_opt().unwrap());

    repo.insert_device(test_device(&device_id)).await.unwrap();

    let location = Location { lat: 12.9, lng: 77.6 };
    repo.append_location(&device_id, location, Utc::now())
        .await
        .unwrap();

    let device = repo.get_device(&device_id).await.unwrap().unwrap();
    assert_eq!(device.location, location);
    assert_eq!(device.history.len(), 1);
    assert_eq!(device.history[0].location, location);

    repo.clear_history(&device_id).await.unwrap();
    let device = repo.get_device(&device_id).await.unwrap().unwrap();
    assert!(device.history.is_empty());
    assert_eq!(device.location, location);

    repo.delete_device(&device_id).await.unwrap();
}
