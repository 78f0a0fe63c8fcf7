use std::sync::Arc;

use crate::error::AppResult;
use domain::object_key::FrameName;

#[async_trait::async_trait]
pub trait FrameAssetPort: Send + Sync {
    async fn load(&self, name: &FrameName) -> AppResult<Option<Vec<u8>>>;

    async fn list(&self) -> AppResult<Vec<FrameName>>;
}

pub type DynFrameAssetPort = Arc<dyn FrameAssetPort>;
