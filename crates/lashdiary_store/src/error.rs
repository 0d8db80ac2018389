// --- File: crates/lashdiary_store/src/error.rs ---
use thiserror::Error;

/// Errors that can occur when accessing the JSON data store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure while reading or writing a collection.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collection file exists but does not parse. Deliberately not
    /// treated as "missing": silently resetting a collection would drop
    /// booked slots.
    #[error("Store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key would escape the data directory or is empty.
    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    /// Missing or unusable store configuration.
    #[error("Store configuration error: {0}")]
    Config(String),
}
