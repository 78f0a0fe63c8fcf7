//! In-memory doubles for the outgoing ports.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::ports::outgoing::{
    blocking_compositor::{BlockingCompositorPort, CompositeJob},
    frame_assets::FrameAssetPort,
    object_store::ObjectStorePort,
    record_store::RecordStorePort,
};
use domain::image::{CompositeResult, ContainerFormat, Dimensions, PixelMode, Quality};
use domain::object_key::{FrameName, ObjectKey};
use domain::record::{ImageRecord, NewImageRecord, RecordId};

pub struct FakeCompositor {
    format: ContainerFormat,
    jobs: Arc<Mutex<Vec<CompositeJob>>>,
}

impl FakeCompositor {
    pub fn new(format: ContainerFormat) -> Self {
        Self {
            format,
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn jobs(&self) -> Vec<CompositeJob> {
        self.jobs.lock().await.clone()
    }
}

impl BlockingCompositorPort for FakeCompositor {
    fn run(
        &self,
        job: CompositeJob,
        _deadline: Duration,
    ) -> Pin<Box<dyn Future<Output = AppResult<CompositeResult>> + Send + 'static>> {
        let jobs = Arc::clone(&self.jobs);
        let format = self.format;
        Box::pin(async move {
            jobs.lock().await.push(job);
            Ok(CompositeResult {
                bytes: b"composited".to_vec(),
                format,
                quality: format.is_lossy().then_some(Quality::MAX),
                dimensions: Dimensions::new(10, 10),
                mode: PixelMode::Rgb,
            })
        })
    }
}

#[derive(Default)]
pub struct InMemoryFrameAssets {
    frames: BTreeMap<String, Vec<u8>>,
}

impl InMemoryFrameAssets {
    pub fn with_frame(name: &str, bytes: &[u8]) -> Self {
        let mut frames = BTreeMap::new();
        frames.insert(name.to_string(), bytes.to_vec());
        Self { frames }
    }
}

#[async_trait::async_trait]
impl FrameAssetPort for InMemoryFrameAssets {
    async fn load(&self, name: &FrameName) -> AppResult<Option<Vec<u8>>> {
        Ok(self.frames.get(name.as_str()).cloned())
    }

    async fn list(&self) -> AppResult<Vec<FrameName>> {
        self.frames
            .keys()
            .map(|name| FrameName::parse(name).map_err(AppError::from))
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_deletes: Mutex<bool>,
}

impl InMemoryObjectStore {
    pub async fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.objects.lock().await.clone()
    }

    pub async fn fail_deletes(&self) {
        *self.fail_deletes.lock().await = true;
    }
}

#[async_trait::async_trait]
impl ObjectStorePort for InMemoryObjectStore {
    async fn upload(&self, key: &ObjectKey, bytes: &[u8]) -> AppResult<()> {
        self.objects
            .lock()
            .await
            .insert(key.as_str().to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &ObjectKey) -> AppResult<Option<Vec<u8>>> {
        Ok(self.objects.lock().await.get(key.as_str()).cloned())
    }

    async fn list(&self) -> AppResult<Vec<ObjectKey>> {
        let mut keys = self
            .objects
            .lock()
            .await
            .keys()
            .map(|k| ObjectKey::parse(k))
            .collect::<Result<Vec<_>, _>>()?;
        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(keys)
    }

    async fn delete(&self, key: &ObjectKey) -> AppResult<()> {
        if *self.fail_deletes.lock().await {
            return Err(AppError::StorageError {
                message: "bucket unavailable".to_string(),
            });
        }
        self.objects.lock().await.remove(key.as_str());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    rows: Mutex<Vec<ImageRecord>>,
    fail_next_create: Mutex<bool>,
}

impl InMemoryRecordStore {
    pub async fn snapshot(&self) -> Vec<ImageRecord> {
        self.rows.lock().await.clone()
    }

    pub async fn fail_next_create(&self) {
        *self.fail_next_create.lock().await = true;
    }
}

#[async_trait::async_trait]
impl RecordStorePort for InMemoryRecordStore {
    async fn create(&self, record: &NewImageRecord) -> AppResult<RecordId> {
        {
            let mut fail = self.fail_next_create.lock().await;
            if *fail {
                *fail = false;
                return Err(AppError::DatabaseError {
                    message: "connection reset".to_string(),
                });
            }
        }

        let mut rows = self.rows.lock().await;
        let id = RecordId::new(rows.iter().map(|r| r.id.value()).max().unwrap_or(0) + 1);
        let position = rows.iter().map(|r| r.position + 1).max().unwrap_or(0);
        rows.push(ImageRecord {
            id,
            original_filename: record.original_filename.clone(),
            processed_url: record.processed_url.clone(),
            object_key: record.object_key.clone(),
            position,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn get(&self, id: RecordId) -> AppResult<Option<ImageRecord>> {
        Ok(self.rows.lock().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<ImageRecord>> {
        let mut rows = self.rows.lock().await.clone();
        rows.sort_by_key(|r| (r.position, r.id));
        Ok(rows)
    }

    async fn delete(&self, id: RecordId) -> AppResult<bool> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }

    async fn reorder(&self, ordered_ids: &[RecordId]) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        for (index, id) in ordered_ids.iter().enumerate() {
            if let Some(row) = rows.iter_mut().find(|r| r.id == *id) {
                row.position = index as i64;
            }
        }
        Ok(())
    }
}
