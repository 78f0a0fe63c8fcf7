use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use framer_adapters::outgoing::{
    fs_tokio::{
        frame_assets_fs::{FsFrameAssetAdapter, FsFrameAssetConfig},
        object_store_fs::{FsObjectStoreAdapter, FsObjectStoreConfig},
    },
    image_rs::compositor_image::{ImageCompositorAdapter, ImageCompositorConfig},
    sqlite_sqlx::{record_store_sqlite::SqliteRecordStoreAdapter, utils::connect},
    tokio_spawn::blocking_compositor_tokio::TokioBlockingCompositorAdapter,
};
use framer_application::error::AppError;
use framer_application::infrastructure_config::Config;
use framer_application::ports::incoming::{
    framing::{AddFrameUseCase, AddWhiteBackgroundUseCase},
    records::RecordsUseCase,
    storage::StorageUseCase,
};
use framer_application::ports::outgoing::{
    compositor::DynCompositorPort, object_store::DynObjectStorePort,
    record_store::DynRecordStorePort,
};
use framer_application::{
    config::FramingSettings,
    framing::service::{FramingService, FramingServiceDeps},
    records::service::RecordService,
    storage::service::StorageService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    db_pool: SqlitePool,
    pub add_frame: Arc<dyn AddFrameUseCase>,
    pub white_background: Arc<dyn AddWhiteBackgroundUseCase>,
    pub records: Arc<dyn RecordsUseCase>,
    pub storage: Arc<dyn StorageUseCase>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let settings = Arc::new(FramingSettings::from_config(&config)?);

        let db_pool = Self::create_database_pool(&config).await?;

        let object_store: DynObjectStorePort =
            Arc::new(FsObjectStoreAdapter::new(FsObjectStoreConfig {
                root_dir: PathBuf::from(&config.storage.root_dir),
            }));
        let record_store: DynRecordStorePort = Arc::new(SqliteRecordStoreAdapter::new(
            db_pool.clone(),
            config.db.query_timeout_secs,
        ));

        let framing_service =
            Self::create_framing_service(&config, &settings, &object_store, &record_store);
        let records = RecordService::new(Arc::clone(&record_store), Arc::clone(&object_store));
        let storage = StorageService::new(
            Arc::clone(&object_store),
            settings.upload_policy.clone(),
        );

        Ok(Self {
            config,
            db_pool,
            add_frame: Arc::clone(&framing_service) as Arc<dyn AddFrameUseCase>,
            white_background: framing_service as Arc<dyn AddWhiteBackgroundUseCase>,
            records,
            storage,
        })
    }

    async fn create_database_pool(config: &Config) -> Result<SqlitePool, AppError> {
        if let Some(parent) = database_file(&config.db.database_url).and_then(Path::parent) {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        connect(&config.db.database_url, config.db.pool_size).await
    }

    fn create_framing_service(
        config: &Config,
        settings: &Arc<FramingSettings>,
        object_store: &DynObjectStorePort,
        record_store: &DynRecordStorePort,
    ) -> Arc<FramingService> {
        let compositor: DynCompositorPort =
            Arc::new(ImageCompositorAdapter::new(ImageCompositorConfig {
                pixel_limit: config.pixel_limit(),
            }));

        FramingService::new(
            settings,
            FramingServiceDeps {
                compositor: Arc::new(TokioBlockingCompositorAdapter::new(compositor)),
                frame_assets: Arc::new(FsFrameAssetAdapter::new(FsFrameAssetConfig {
                    directory: PathBuf::from(&config.frames.directory),
                })),
                object_store: Arc::clone(object_store),
                record_store: Arc::clone(record_store),
            },
        )
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub async fn close(&self) {
        self.db_pool.close().await;
    }
}

/// Path of an on-disk sqlite database, `None` for in-memory URLs.
fn database_file(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next()?;

    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}
