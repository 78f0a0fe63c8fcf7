use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use domain::image::{BackgroundCoefficient, PixelLimit, Quality};
use domain::object_key::FrameName;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub compositor: CompositorConfig,
    pub uploads: UploadConfig,
    pub frames: FramesConfig,
    pub storage: StorageConfig,
    pub db: DbConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositorConfig {
    pub max_image_pixels: u64,
    pub default_quality: u8,
    pub timeout_secs: u64,
    pub white_background_coefficient: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub allowed_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesConfig {
    pub directory: String,
    pub default_frame: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub root_dir: String,
    pub public_url_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub database_url: String,
    pub pool_size: u32,
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compositor: CompositorConfig {
                max_image_pixels: PixelLimit::DEFAULT.max_pixels(),
                default_quality: Quality::MAX.value(),
                timeout_secs: 30,
                white_background_coefficient: BackgroundCoefficient::DEFAULT.value(),
            },
            uploads: UploadConfig {
                max_file_size: 10 * 1024 * 1024,
                allowed_types: vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                    "image/webp".to_string(),
                    "image/gif".to_string(),
                ],
            },
            frames: FramesConfig {
                directory: "frames".to_string(),
                default_frame: FrameName::DEFAULT.to_string(),
            },
            storage: StorageConfig {
                root_dir: "data/objects".to_string(),
                public_url_prefix: "/s3/file".to_string(),
            },
            db: DbConfig {
                database_url: "sqlite://data/framer.db".to_string(),
                pool_size: 5,
                query_timeout_secs: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
            environment: EnvironmentConfig {
                env: "development".to_string(),
            },
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if self.compositor.max_image_pixels == 0 {
            return Err(AppError::ConfigError {
                message: "max_image_pixels must be greater than 0".to_string(),
            });
        }

        Quality::new(self.compositor.default_quality).map_err(|e| AppError::ConfigError {
            message: format!("default_quality: {e}"),
        })?;

        if self.compositor.timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "compositor timeout_secs must be greater than 0".to_string(),
            });
        }

        BackgroundCoefficient::new(self.compositor.white_background_coefficient).map_err(|e| {
            AppError::ConfigError {
                message: format!("white_background_coefficient: {e}"),
            }
        })?;

        if self.uploads.max_file_size == 0 {
            return Err(AppError::ConfigError {
                message: "max_file_size must be greater than 0".to_string(),
            });
        }

        if self.uploads.allowed_types.is_empty() {
            return Err(AppError::ConfigError {
                message: "allowed_types cannot be empty".to_string(),
            });
        }

        if self.frames.directory.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "frames directory cannot be empty".to_string(),
            });
        }

        FrameName::parse(&self.frames.default_frame).map_err(|e| AppError::ConfigError {
            message: format!("default_frame: {e}"),
        })?;

        if self.storage.root_dir.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "storage root_dir cannot be empty".to_string(),
            });
        }

        if self.db.database_url.is_empty() {
            return Err(AppError::ConfigError {
                message: "database_url cannot be empty".to_string(),
            });
        }

        if self.db.pool_size == 0 {
            return Err(AppError::ConfigError {
                message: "db pool_size must be greater than 0".to_string(),
            });
        }

        if self.db.query_timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "db query_timeout_secs must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn pixel_limit(&self) -> PixelLimit {
        PixelLimit::new(self.compositor.max_image_pixels)
    }
}
