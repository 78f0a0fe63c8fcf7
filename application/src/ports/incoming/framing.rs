use serde::Serialize;

use crate::error::AppResult;
use domain::image::{ContainerFormat, Dimensions, Quality};
use domain::object_key::{FrameName, ObjectKey};
use domain::record::RecordId;

/// Raw upload as received from the caller.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AddFrameCommand {
    pub upload: Upload,
    pub frame_name: Option<String>,
    /// Requested JPEG quality; clamped to `1..=100`.
    pub quality: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AddWhiteBackgroundCommand {
    pub upload: Upload,
    pub coefficient: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FramedImage {
    pub record_id: RecordId,
    pub filename: String,
    pub url: String,
    pub object_key: ObjectKey,
    pub format: ContainerFormat,
    pub quality: Option<Quality>,
    pub dimensions: Dimensions,
}

#[async_trait::async_trait]
pub trait AddFrameUseCase: Send + Sync {
    async fn add_frame(&self, command: AddFrameCommand) -> AppResult<FramedImage>;

    async fn list_frames(&self) -> AppResult<Vec<FrameName>>;
}

#[async_trait::async_trait]
pub trait AddWhiteBackgroundUseCase: Send + Sync {
    async fn add_white_background(
        &self,
        command: AddWhiteBackgroundCommand,
    ) -> AppResult<FramedImage>;
}
