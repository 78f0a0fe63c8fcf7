use std::io;
use thiserror::Error;

use domain::error::DomainError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Cannot decode image: {message}")]
    DecodeError { message: String },

    #[error("Image size is too large: {pixels} pixels exceeds limit of {limit}")]
    OversizeImage { pixels: u64, limit: u64 },

    #[error("Cannot encode image: {message}")]
    EncodeError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task error: {message}")]
    TaskError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl AppError {
    /// Whether the failure was caused by the caller's input rather than by this service.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Domain(DomainError::ConfigError { .. }) => false,
            Self::Domain(_)
            | Self::ValidationError { .. }
            | Self::NotFound { .. }
            | Self::DecodeError { .. }
            | Self::OversizeImage { .. } => true,
            Self::EncodeError { .. }
            | Self::StorageError { .. }
            | Self::DatabaseError { .. }
            | Self::IoError(_)
            | Self::JsonError(_)
            | Self::TaskError { .. }
            | Self::ConfigError { .. } => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_oversize_are_client_errors() {
        assert!(
            AppError::DecodeError {
                message: "garbage".to_string()
            }
            .is_client_error()
        );
        assert!(
            AppError::OversizeImage {
                pixels: 10,
                limit: 5
            }
            .is_client_error()
        );
        assert!(
            AppError::from(DomainError::OversizeImage {
                pixels: 10,
                limit: 5
            })
            .is_client_error()
        );
    }

    #[test]
    fn encode_and_storage_are_server_errors() {
        assert!(
            !AppError::EncodeError {
                message: "buffer".to_string()
            }
            .is_client_error()
        );
        assert!(
            !AppError::StorageError {
                message: "disk".to_string()
            }
            .is_client_error()
        );
        assert!(
            !AppError::from(DomainError::ConfigError {
                message: "bad".to_string()
            })
            .is_client_error()
        );
    }
}
