use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid device ID: {0}")]
    InvalidDeviceId(String),

    #[error("Invalid device name: {0}")]
    InvalidDeviceName(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device already exists: {0}")]
    DeviceAlreadyExists(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Device {device_id} was registered but has no route, and removing the orphan record failed")]
    RegistrationIncomplete {
        device_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
