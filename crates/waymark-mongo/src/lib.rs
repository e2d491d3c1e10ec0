mod client;
mod config;
mod device_repository;
mod models;

pub use client::MongoClient;
pub use config::MongoConfig;
pub use device_repository::MongoDeviceRepository;
pub use models::{DeviceDocument, HistoryEntryDocument, LocationDocument};
