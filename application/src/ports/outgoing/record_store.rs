use std::sync::Arc;

use crate::error::AppResult;
use domain::record::{ImageRecord, NewImageRecord, RecordId};

#[async_trait::async_trait]
pub trait RecordStorePort: Send + Sync {
    async fn create(&self, record: &NewImageRecord) -> AppResult<RecordId>;

    async fn get(&self, id: RecordId) -> AppResult<Option<ImageRecord>>;

    /// Records ordered by position, then by insertion.
    async fn list(&self) -> AppResult<Vec<ImageRecord>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: RecordId) -> AppResult<bool>;

    /// Assigns each listed id its index as position; unknown ids are skipped.
    async fn reorder(&self, ordered_ids: &[RecordId]) -> AppResult<()>;
}

pub type DynRecordStorePort = Arc<dyn RecordStorePort>;
