use std::sync::Arc;

use crate::error::AppResult;
use domain::object_key::ObjectKey;

#[async_trait::async_trait]
pub trait ObjectStorePort: Send + Sync {
    async fn upload(&self, key: &ObjectKey, bytes: &[u8]) -> AppResult<()>;

    async fn get(&self, key: &ObjectKey) -> AppResult<Option<Vec<u8>>>;

    async fn list(&self) -> AppResult<Vec<ObjectKey>>;

    /// Deleting a missing key succeeds.
    async fn delete(&self, key: &ObjectKey) -> AppResult<()>;
}

pub type DynObjectStorePort = Arc<dyn ObjectStorePort>;
