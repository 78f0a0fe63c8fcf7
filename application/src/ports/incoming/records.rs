use crate::error::AppResult;
use domain::record::{ImageRecord, RecordId};

#[async_trait::async_trait]
pub trait RecordsUseCase: Send + Sync {
    async fn list_records(&self) -> AppResult<Vec<ImageRecord>>;

    async fn delete_record(&self, id: RecordId) -> AppResult<()>;

    async fn reorder_records(&self, ordered_ids: &[RecordId]) -> AppResult<()>;
}
