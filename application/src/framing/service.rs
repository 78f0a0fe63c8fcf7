use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use domain::{
    image::{BackgroundCoefficient, CompositeResult, Quality},
    object_key::{FrameName, ObjectKey},
    record::NewImageRecord,
};

use crate::{
    config::FramingSettings,
    error::{AppError, AppResult},
    ports::{
        incoming::framing::{
            AddFrameCommand, AddFrameUseCase, AddWhiteBackgroundCommand,
            AddWhiteBackgroundUseCase, FramedImage, Upload,
        },
        outgoing::{
            blocking_compositor::{CompositeJob, DynBlockingCompositorPort},
            frame_assets::DynFrameAssetPort,
            object_store::DynObjectStorePort,
            record_store::DynRecordStorePort,
        },
    },
};

pub struct FramingServiceDeps {
    pub compositor: DynBlockingCompositorPort,
    pub frame_assets: DynFrameAssetPort,
    pub object_store: DynObjectStorePort,
    pub record_store: DynRecordStorePort,
}

pub struct FramingService {
    settings: Arc<FramingSettings>,
    compositor: DynBlockingCompositorPort,
    frame_assets: DynFrameAssetPort,
    object_store: DynObjectStorePort,
    record_store: DynRecordStorePort,
}

impl FramingService {
    #[must_use]
    pub fn new(settings: &Arc<FramingSettings>, deps: FramingServiceDeps) -> Arc<Self> {
        Arc::new(Self {
            settings: Arc::clone(settings),
            compositor: deps.compositor,
            frame_assets: deps.frame_assets,
            object_store: deps.object_store,
            record_store: deps.record_store,
        })
    }

    fn check_upload(&self, upload: &Upload) -> AppResult<()> {
        self.settings
            .upload_policy
            .check(upload.content_type.as_deref(), upload.bytes.len())
    }

    async fn load_frame(&self, requested: Option<&str>) -> AppResult<(FrameName, Vec<u8>)> {
        let name = match requested {
            Some(name) => FrameName::parse(name)?,
            None => self.settings.default_frame.clone(),
        };

        match self.frame_assets.load(&name).await? {
            Some(bytes) => Ok((name, bytes)),
            None => Err(AppError::NotFound {
                message: format!("Frame '{name}' not found"),
            }),
        }
    }

    /// Uploads the encoded result, then records it. An upload without a record is logged.
    async fn persist(&self, filename: String, result: CompositeResult) -> AppResult<FramedImage> {
        let object_key = ObjectKey::for_container(result.format);
        self.object_store.upload(&object_key, &result.bytes).await?;

        let url = object_key.public_url(&self.settings.public_url_prefix);
        let record = NewImageRecord::new(filename.clone(), url.clone(), object_key.clone());

        let record_id = match self.record_store.create(&record).await {
            Ok(id) => id,
            Err(e) => {
                error!(
                    object_key = %object_key,
                    original_filename = %filename,
                    error = %e,
                    "Object stored but record creation failed; object is orphaned"
                );
                return Err(e);
            }
        };

        info!(
            record_id = %record_id,
            object_key = %object_key,
            format = %result.format,
            dimensions = %result.dimensions,
            mode = %result.mode,
            size = result.bytes.len(),
            "Processed image stored"
        );

        Ok(FramedImage {
            record_id,
            filename,
            url,
            object_key,
            format: result.format,
            quality: result.quality,
            dimensions: result.dimensions,
        })
    }
}

#[async_trait::async_trait]
impl AddFrameUseCase for FramingService {
    #[instrument(skip(self, command), fields(filename = %command.upload.filename))]
    async fn add_frame(&self, command: AddFrameCommand) -> AppResult<FramedImage> {
        self.check_upload(&command.upload)?;
        let (frame_name, overlay) = self.load_frame(command.frame_name.as_deref()).await?;
        let quality = command
            .quality
            .map_or(self.settings.default_quality, Quality::clamped);

        debug!(frame = %frame_name, quality = %quality, "Compositing frame");

        let Upload {
            filename, bytes, ..
        } = command.upload;
        let job = CompositeJob::AddFrame {
            source: bytes,
            overlay,
            quality,
        };
        let result = self
            .compositor
            .run(job, self.settings.compositor_timeout)
            .await?;

        self.persist(filename, result).await
    }

    async fn list_frames(&self) -> AppResult<Vec<FrameName>> {
        self.frame_assets.list().await
    }
}

#[async_trait::async_trait]
impl AddWhiteBackgroundUseCase for FramingService {
    #[instrument(skip(self, command), fields(filename = %command.upload.filename))]
    async fn add_white_background(
        &self,
        command: AddWhiteBackgroundCommand,
    ) -> AppResult<FramedImage> {
        self.check_upload(&command.upload)?;
        let coefficient = match command.coefficient {
            Some(value) => BackgroundCoefficient::new(value)?,
            None => self.settings.white_background_coefficient,
        };

        let Upload {
            filename, bytes, ..
        } = command.upload;
        let job = CompositeJob::WhiteBackground {
            source: bytes,
            coefficient,
        };
        let result = self
            .compositor
            .run(job, self.settings.compositor_timeout)
            .await?;

        self.persist(filename, result).await
    }
}
