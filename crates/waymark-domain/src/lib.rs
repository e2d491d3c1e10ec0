pub mod device;
pub mod device_service;
pub mod error;
pub mod fabric;
pub mod location_service;
pub mod messaging_service;
pub mod repository;

pub use device::{Device, HistoryEntry, Location, MetadataPatch, RegisterDeviceInput};
pub use device_service::DeviceService;
pub use error::{DomainError, DomainResult};
pub use fabric::TopicFabric;
pub use location_service::LocationService;
pub use messaging_service::MessagingService;
pub use repository::DeviceRepository;
