use std::time::Duration;

/// Connection settings for the device store.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    pub url: String,
    /// Database holding the `devices` collection.
    pub database: String,
    /// Budget for any single store operation. Expiry surfaces as a transport
    /// failure; there is no retry at this layer.
    pub op_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "waymark".to_string(),
            op_timeout: Duration::from_secs(5),
        }
    }
}
