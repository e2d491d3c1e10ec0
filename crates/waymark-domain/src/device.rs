use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographical position. Range validation is deliberately absent; callers
/// may store any pair of floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// One immutable entry in a device's location timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub location: Location,
}

/// Domain representation of a tracked device.
///
/// The storage layer keeps its own surrogate id; it never appears here and is
/// never used as a routing key. `device_id` is the only identity the rest of
/// the system sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    pub name: String,
    pub device_type: String,
    pub status: String,
    pub battery_level: i32,
    pub last_updated: DateTime<Utc>,
    pub location: Location,
    pub history: Vec<HistoryEntry>,
}

/// Input for registering a new device. Location and history are always
/// zero-initialized by the service, so they are not accepted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterDeviceInput {
    pub device_id: String,
    pub name: String,
    pub device_type: String,
    pub status: String,
    pub battery_level: i32,
}

/// Field-whitelist patch for metadata updates. Absent fields are left
/// untouched by the repository; `history` and `location` are never part of
/// the whitelist (location is reset separately, see `DeviceService`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataPatch {
    pub name: Option<String>,
    pub device_type: Option<String>,
    pub status: Option<String>,
    pub battery_level: Option<i32>,
}
