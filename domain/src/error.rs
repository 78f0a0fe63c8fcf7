use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid quality: {0} (expected 1-100)")]
    InvalidQuality(i64),

    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),

    #[error("Invalid frame name: {0}")]
    InvalidFrameName(String),

    #[error("Invalid background coefficient: {0}")]
    InvalidCoefficient(String),

    #[error("Image size is too large: {pixels} pixels exceeds limit of {limit}")]
    OversizeImage { pixels: u64, limit: u64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
