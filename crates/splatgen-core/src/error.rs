//! Error types for splatgen

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplatError {
    // Decode errors
    #[error("Invalid point-cloud data: {reason}")]
    InvalidFormat { reason: String },

    #[error("Missing required vertex property: {name}")]
    MissingPositionProperty { name: String },

    #[error("Unknown property type token: {token}")]
    UnknownPropertyType { token: String },

    // Export errors
    #[error("No geometry loaded. Decode a point cloud before exporting")]
    NoGeometryLoaded,

    #[error("Unsupported export format: {name}. Use ply, obj, or glb")]
    UnsupportedExportFormat { name: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SplatError>;
