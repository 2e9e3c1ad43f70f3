//! Unified error types for `tulista`.
//!
//! Database and configuration failures propagate as errors; corrupt persisted
//! blobs deliberately do not (the store falls back to defaults instead).

use thiserror::Error;

/// All error conditions surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Underlying database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The static catalog source could not be read or parsed; fatal at startup
    #[error("Catalog load error: {message}")]
    CatalogLoad {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// A value could not be serialized for persistence
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Finalizing a shopping run with no products checked
    #[error("No products are checked")]
    EmptyRun,

    /// I/O error (catalog file, config file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
