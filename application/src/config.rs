use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::infrastructure_config::Config;
use domain::image::{BackgroundCoefficient, Quality};
use domain::object_key::FrameName;

/// Size and MIME checks applied to every upload before it reaches the compositor.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_file_size: usize,
    allowed_types: Arc<HashSet<String>>,
}

impl UploadPolicy {
    #[must_use]
    pub fn new<I, S>(max_file_size: usize, allowed_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            max_file_size,
            allowed_types: Arc::new(
                allowed_types
                    .into_iter()
                    .map(|t| t.as_ref().trim().to_ascii_lowercase())
                    .collect(),
            ),
        }
    }

    #[must_use]
    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn check(&self, content_type: Option<&str>, size: usize) -> AppResult<()> {
        if size > self.max_file_size {
            return Err(AppError::ValidationError {
                message: format!(
                    "File is too large! ({size} bytes, limit {} bytes)",
                    self.max_file_size
                ),
            });
        }

        // "image/png; charset=binary" -> "image/png"
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match essence {
            Some(ct) if self.allowed_types.contains(&ct) => Ok(()),
            Some(ct) => Err(AppError::ValidationError {
                message: format!("File type is unknown! ({ct})"),
            }),
            None => Err(AppError::ValidationError {
                message: "File type is unknown!".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FramingSettings {
    pub default_frame: FrameName,
    pub default_quality: Quality,
    pub white_background_coefficient: BackgroundCoefficient,
    pub public_url_prefix: String,
    pub compositor_timeout: Duration,
    pub upload_policy: UploadPolicy,
}

impl FramingSettings {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            default_frame: FrameName::parse(&config.frames.default_frame)?,
            default_quality: Quality::new(config.compositor.default_quality)?,
            white_background_coefficient: BackgroundCoefficient::new(
                config.compositor.white_background_coefficient,
            )?,
            public_url_prefix: config.storage.public_url_prefix.clone(),
            compositor_timeout: Duration::from_secs(config.compositor.timeout_secs),
            upload_policy: UploadPolicy::new(
                config.uploads.max_file_size,
                &config.uploads.allowed_types,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UploadPolicy {
        UploadPolicy::new(1024, ["image/png", "IMAGE/JPEG"])
    }

    #[test]
    fn accepts_allowed_types_case_insensitively() {
        assert!(policy().check(Some("image/png"), 10).is_ok());
        assert!(policy().check(Some("image/jpeg"), 10).is_ok());
        assert!(policy().check(Some("Image/PNG; charset=binary"), 1024).is_ok());
    }

    #[test]
    fn rejects_oversized_and_unknown_uploads() {
        assert!(matches!(
            policy().check(Some("image/png"), 1025),
            Err(AppError::ValidationError { message }) if message.starts_with("File is too large!")
        ));
        assert!(matches!(
            policy().check(Some("application/pdf"), 10),
            Err(AppError::ValidationError { message }) if message.starts_with("File type is unknown!")
        ));
        assert!(policy().check(None, 10).is_err());
    }

    #[test]
    fn settings_follow_config() {
        let settings = FramingSettings::from_config(&Config::default()).unwrap();
        assert_eq!(settings.default_frame.as_str(), "frame.png");
        assert_eq!(settings.default_quality, Quality::MAX);
        assert_eq!(settings.compositor_timeout, Duration::from_secs(30));
        assert_eq!(settings.upload_policy.max_file_size(), 10 * 1024 * 1024);
    }
}
