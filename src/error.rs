//! Error types for engine operations

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, TileJoinError>;

/// Errors that can occur while executing a spatial query
#[derive(Error, Debug)]
pub enum TileJoinError {
    /// Invalid WKT (Well-Known Text) format
    #[error("Invalid WKT format: {0}")]
    InvalidWkt(String),

    /// Malformed input record, unknown set id, or missing field position
    #[error("Schema error: {0}")]
    Schema(String),

    /// Spatial index construction failed
    #[error("Index error: {0}")]
    Index(String),

    /// Cache file absent, unreadable, or empty
    #[error("Cache file error: {0}")]
    Cache(String),

    /// Invalid operator configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Geometry operation failed
    #[error("Geometry operation failed: {0}")]
    GeometryOperationFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TileJoinError::InvalidWkt("unexpected token".to_string());
        assert_eq!(err.to_string(), "Invalid WKT format: unexpected token");

        let err = TileJoinError::Schema("wrong sid: 7".to_string());
        assert_eq!(err.to_string(), "Schema error: wrong sid: 7");
    }
}
