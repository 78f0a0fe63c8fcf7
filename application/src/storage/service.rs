use std::sync::Arc;
use tracing::{info, instrument};

use domain::object_key::ObjectKey;

use crate::{
    config::UploadPolicy,
    error::{AppError, AppResult},
    ports::{
        incoming::{
            framing::Upload,
            storage::{StorageUseCase, StoredObject},
        },
        outgoing::object_store::DynObjectStorePort,
    },
};

pub struct StorageService {
    object_store: DynObjectStorePort,
    upload_policy: UploadPolicy,
}

impl StorageService {
    #[must_use]
    pub fn new(object_store: DynObjectStorePort, upload_policy: UploadPolicy) -> Arc<Self> {
        Arc::new(Self {
            object_store,
            upload_policy,
        })
    }
}

#[async_trait::async_trait]
impl StorageUseCase for StorageService {
    async fn list_objects(&self) -> AppResult<Vec<ObjectKey>> {
        self.object_store.list().await
    }

    async fn get_object(&self, key: &str) -> AppResult<Vec<u8>> {
        let key = ObjectKey::parse(key)?;
        self.object_store
            .get(&key)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: format!("Object {key} not found"),
            })
    }

    #[instrument(skip(self, upload), fields(filename = %upload.filename, size = upload.bytes.len()))]
    async fn upload_original(&self, upload: Upload) -> AppResult<StoredObject> {
        self.upload_policy
            .check(upload.content_type.as_deref(), upload.bytes.len())?;

        let object_key = ObjectKey::for_upload(&upload.filename);
        self.object_store.upload(&object_key, &upload.bytes).await?;

        info!(object_key = %object_key, "File uploaded");

        Ok(StoredObject {
            original_filename: upload.filename,
            object_key,
            size: upload.bytes.len(),
            content_type: upload.content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryObjectStore;

    fn service() -> (Arc<StorageService>, Arc<InMemoryObjectStore>) {
        let objects = Arc::new(InMemoryObjectStore::default());
        let service = StorageService::new(
            Arc::clone(&objects) as DynObjectStorePort,
            UploadPolicy::new(16, ["image/png"]),
        );
        (service, objects)
    }

    fn upload(bytes: &[u8], content_type: &str) -> Upload {
        Upload {
            filename: "scan.png".to_string(),
            content_type: Some(content_type.to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn upload_then_get_round_trips() {
        let (service, _) = service();

        let stored = service
            .upload_original(upload(b"png-bytes", "image/png"))
            .await
            .unwrap();

        assert!(stored.object_key.as_str().ends_with(".png"));
        assert_eq!(stored.size, 9);
        let fetched = service.get_object(stored.object_key.as_str()).await.unwrap();
        assert_eq!(fetched, b"png-bytes");
        assert_eq!(service.list_objects().await.unwrap(), vec![stored.object_key]);
    }

    #[tokio::test]
    async fn upload_policy_is_enforced() {
        let (service, objects) = service();

        let too_big = service
            .upload_original(upload(&[0; 17], "image/png"))
            .await
            .unwrap_err();
        let wrong_type = service
            .upload_original(upload(b"x", "text/plain"))
            .await
            .unwrap_err();

        assert!(matches!(too_big, AppError::ValidationError { .. }));
        assert!(matches!(wrong_type, AppError::ValidationError { .. }));
        assert!(objects.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn get_rejects_bad_keys_and_missing_objects() {
        let (service, _) = service();

        assert!(matches!(
            service.get_object("missing.png").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.get_object("../etc/passwd").await,
            Err(AppError::Domain(_))
        ));
    }
}
