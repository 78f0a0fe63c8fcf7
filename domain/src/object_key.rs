use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::image::ContainerFormat;

const MAX_SEGMENT_LEN: usize = 255;

/// Validates a flat name that must map to exactly one path segment.
fn validate_segment(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }

    if value.len() > MAX_SEGMENT_LEN {
        return Err(format!("must be at most {MAX_SEGMENT_LEN} bytes"));
    }

    if value.starts_with('.') {
        return Err("must not start with '.'".to_string());
    }

    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(format!("contains disallowed character {bad:?}"));
    }

    Ok(())
}

/// Key of a stored object, e.g. `3f1c...e2.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn parse(value: &str) -> DomainResult<Self> {
        validate_segment(value)
            .map_err(|reason| DomainError::InvalidObjectKey(format!("{value:?} {reason}")))?;
        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn for_container(format: ContainerFormat) -> Self {
        Self(format!("{}.{}", Uuid::new_v4(), format.extension()))
    }

    /// Fresh key keeping the extension of the uploaded file name, if it has a usable one.
    #[must_use]
    pub fn for_upload(original_filename: &str) -> Self {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.len() <= 16)
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

        match extension {
            Some(ext) => Self(format!("{}.{}", Uuid::new_v4(), ext)),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn public_url(&self, prefix: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a frame asset in the frame directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameName(String);

impl FrameName {
    pub const DEFAULT: &'static str = "frame.png";

    pub fn parse(value: &str) -> DomainResult<Self> {
        validate_segment(value)
            .map_err(|reason| DomainError::InvalidFrameName(format!("{value:?} {reason}")))?;
        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FrameName {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for FrameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_use_container_extension() {
        let key = ObjectKey::for_container(ContainerFormat::Webp);
        assert!(key.as_str().ends_with(".webp"));
        assert!(ObjectKey::parse(key.as_str()).is_ok());
        assert_ne!(key, ObjectKey::for_container(ContainerFormat::Webp));
    }

    #[test]
    fn upload_keys_keep_sane_extensions_only() {
        assert!(ObjectKey::for_upload("holiday.JPG").as_str().ends_with(".JPG"));
        assert!(!ObjectKey::for_upload("noext").as_str().contains('.'));
        assert!(!ObjectKey::for_upload("weird.p/ng").as_str().contains('/'));
    }

    #[test]
    fn traversal_and_separators_are_rejected() {
        for bad in ["", "../etc/passwd", "a/b.png", ".hidden", "a\\b", "sp ace.png"] {
            assert!(ObjectKey::parse(bad).is_err(), "{bad:?} should be rejected");
            assert!(FrameName::parse(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(FrameName::parse("gold_frame-2.png").is_ok());
    }

    #[test]
    fn public_url_joins_prefix() {
        let key = ObjectKey::parse("abc.png").unwrap();
        assert_eq!(key.public_url("/s3/file/"), "/s3/file/abc.png");
        assert_eq!(key.public_url("/s3/file"), "/s3/file/abc.png");
    }
}
