use serde::Serialize;

use crate::error::AppResult;
use crate::ports::incoming::framing::Upload;
use domain::object_key::ObjectKey;

#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub original_filename: String,
    pub object_key: ObjectKey,
    pub size: usize,
    pub content_type: Option<String>,
}

#[async_trait::async_trait]
pub trait StorageUseCase: Send + Sync {
    async fn list_objects(&self) -> AppResult<Vec<ObjectKey>>;

    async fn get_object(&self, key: &str) -> AppResult<Vec<u8>>;

    async fn upload_original(&self, upload: Upload) -> AppResult<StoredObject>;
}
