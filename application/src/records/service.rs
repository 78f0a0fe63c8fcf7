use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use domain::record::{ImageRecord, RecordId};

use crate::{
    error::{AppError, AppResult},
    ports::{
        incoming::records::RecordsUseCase,
        outgoing::{object_store::DynObjectStorePort, record_store::DynRecordStorePort},
    },
};

pub struct RecordService {
    record_store: DynRecordStorePort,
    object_store: DynObjectStorePort,
}

impl RecordService {
    #[must_use]
    pub fn new(record_store: DynRecordStorePort, object_store: DynObjectStorePort) -> Arc<Self> {
        Arc::new(Self {
            record_store,
            object_store,
        })
    }
}

#[async_trait::async_trait]
impl RecordsUseCase for RecordService {
    async fn list_records(&self) -> AppResult<Vec<ImageRecord>> {
        self.record_store.list().await
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: RecordId) -> AppResult<()> {
        let record = self
            .record_store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: format!("Image {id} not found"),
            })?;

        if let Err(e) = self.object_store.delete(&record.object_key).await {
            error!(
                record_id = %id,
                object_key = %record.object_key,
                error = %e,
                "Failed to delete stored object; record kept"
            );
            return Err(AppError::StorageError {
                message: format!("Failed to delete object {}: {e}", record.object_key),
            });
        }

        if !self.record_store.delete(id).await? {
            warn!(record_id = %id, "Record vanished before it could be deleted");
        }

        info!(record_id = %id, object_key = %record.object_key, "Image deleted");
        Ok(())
    }

    #[instrument(skip(self, ordered_ids), fields(count = ordered_ids.len()))]
    async fn reorder_records(&self, ordered_ids: &[RecordId]) -> AppResult<()> {
        self.record_store.reorder(ordered_ids).await
    }
}
