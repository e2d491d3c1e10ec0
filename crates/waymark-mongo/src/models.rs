use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waymark_domain::{Device, HistoryEntry, Location};

/// Stored shape of a location pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationDocument {
    pub lat: f64,
    pub lng: f64,
}

/// Stored shape of a history entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntryDocument {
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    pub location: LocationDocument,
}

/// Device document as persisted in the `devices` collection. Field names are
/// part of the stored contract and stay camelCase. The `_id` surrogate is
/// storage-internal and never crosses into the domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: String,
    #[serde(rename = "batteryLevel")]
    pub battery_level: i32,
    #[serde(rename = "lastUpdated", with = "chrono_datetime_as_bson_datetime")]
    pub last_updated: DateTime<Utc>,
    pub location: LocationDocument,
    pub history: Vec<HistoryEntryDocument>,
}

impl From<Location> for LocationDocument {
    fn from(location: Location) -> Self {
        Self {
            lat: location.lat,
            lng: location.lng,
        }
    }
}

impl From<LocationDocument> for Location {
    fn from(doc: LocationDocument) -> Self {
        Self {
            lat: doc.lat,
            lng: doc.lng,
        }
    }
}

impl From<HistoryEntryDocument> for HistoryEntry {
    fn from(doc: HistoryEntryDocument) -> Self {
        Self {
            timestamp: doc.timestamp,
            location: doc.location.into(),
        }
    }
}

/// Convert a domain device to its stored form (for insert; `_id` is assigned
/// by the store).
impl From<&Device> for DeviceDocument {
    fn from(device: &Device) -> Self {
        Self {
            id: None,
            device_id: device.device_id.clone(),
            name: device.name.clone(),
            device_type: device.device_type.clone(),
            status: device.status.clone(),
            battery_level: device.battery_level,
            last_updated: device.last_updated,
            location: device.location.into(),
            history: device
                .history
                .iter()
                .map(|entry| HistoryEntryDocument {
                    timestamp: entry.timestamp,
                    location: entry.location.into(),
                })
                .collect(),
        }
    }
}

/// Convert a stored document back to the domain shape, dropping the surrogate.
impl From<DeviceDocument> for Device {
    fn from(doc: DeviceDocument) -> Self {
        Self {
            device_id: doc.device_id,
            name: doc.name,
            device_type: doc.device_type,
            status: doc.status,
            battery_level: doc.battery_level,
            last_updated: doc.last_updated,
            location: doc.location.into(),
            history: doc.history.into_iter().map(Into::into).collect(),
        }
    }
}
