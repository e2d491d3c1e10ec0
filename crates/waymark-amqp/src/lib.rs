mod client;
mod config;
mod fabric;

pub use client::{AmqpClient, DEVICE_EXCHANGE};
pub use config::AmqpConfig;
pub use fabric::AmqpTopicFabric;
