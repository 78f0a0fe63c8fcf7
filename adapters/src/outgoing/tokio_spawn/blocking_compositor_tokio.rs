use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::{task::spawn_blocking, time::timeout};
use tracing::warn;

use domain::image::CompositeResult;
use framer_application::{
    error::{AppError, AppResult},
    ports::outgoing::{
        blocking_compositor::{BlockingCompositorPort, CompositeJob},
        compositor::DynCompositorPort,
    },
};

pub struct TokioBlockingCompositorAdapter {
    compositor: DynCompositorPort,
}

impl TokioBlockingCompositorAdapter {
    pub fn new(compositor: DynCompositorPort) -> Self {
        Self { compositor }
    }
}

impl BlockingCompositorPort for TokioBlockingCompositorAdapter {
    fn run(
        &self,
        job: CompositeJob,
        deadline: Duration,
    ) -> Pin<Box<dyn Future<Output = AppResult<CompositeResult>> + Send + 'static>> {
        let compositor = Arc::clone(&self.compositor);
        let kind = job.kind();

        Box::pin(async move {
            let task = spawn_blocking(move || match job {
                CompositeJob::AddFrame {
                    source,
                    overlay,
                    quality,
                } => compositor.composite(&source, &overlay, quality),
                CompositeJob::WhiteBackground {
                    source,
                    coefficient,
                } => compositor.pad_white(&source, coefficient),
            });

            timeout(deadline, task)
                .await
                .map_err(|_| {
                    warn!(job = kind, ?deadline, "Compositor job timed out");
                    AppError::TaskError {
                        message: format!("{kind} did not finish within {deadline:?}"),
                    }
                })?
                .map_err(|e| AppError::TaskError {
                    message: format!("{kind} task failed: {e}"),
                })?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::image::{
        BackgroundCoefficient, ContainerFormat, Dimensions, PixelMode, Quality,
    };
    use framer_application::ports::outgoing::compositor::CompositorPort;
    use std::thread;
    use std::time::Instant;

    struct StubCompositor {
        delay: Duration,
    }

    impl StubCompositor {
        fn result(bytes: &[u8], format: ContainerFormat) -> CompositeResult {
            CompositeResult {
                bytes: bytes.to_vec(),
                format,
                quality: None,
                dimensions: Dimensions::new(1, 1),
                mode: PixelMode::Rgb,
            }
        }

        fn stall(&self) {
            let until = Instant::now() + self.delay;
            while let Some(left) = until.checked_duration_since(Instant::now()) {
                if left.is_zero() {
                    break;
                }
                thread::park_timeout(left);
            }
        }
    }

    impl CompositorPort for StubCompositor {
        fn composite(
            &self,
            source: &[u8],
            _overlay: &[u8],
            _quality: Quality,
        ) -> AppResult<CompositeResult> {
            self.stall();
            if source.is_empty() {
                return Err(AppError::DecodeError {
                    message: "empty".to_string(),
                });
            }
            Ok(Self::result(source, ContainerFormat::Png))
        }

        fn pad_white(
            &self,
            _source: &[u8],
            _coefficient: BackgroundCoefficient,
        ) -> AppResult<CompositeResult> {
            self.stall();
            Ok(Self::result(b"white", ContainerFormat::Jpeg))
        }
    }

    fn adapter(delay: Duration) -> TokioBlockingCompositorAdapter {
        TokioBlockingCompositorAdapter::new(Arc::new(StubCompositor { delay }))
    }

    fn add_frame(source: &[u8]) -> CompositeJob {
        CompositeJob::AddFrame {
            source: source.to_vec(),
            overlay: Vec::new(),
            quality: Quality::MAX,
        }
    }

    #[tokio::test]
    async fn dispatches_jobs_to_matching_operation() {
        let adapter = adapter(Duration::ZERO);

        let framed = adapter
            .run(add_frame(b"src"), Duration::from_secs(5))
            .await
            .unwrap();
        let padded = adapter
            .run(
                CompositeJob::WhiteBackground {
                    source: b"src".to_vec(),
                    coefficient: BackgroundCoefficient::DEFAULT,
                },
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(framed.bytes, b"src");
        assert_eq!(padded.format, ContainerFormat::Jpeg);
    }

    #[tokio::test]
    async fn compositor_errors_pass_through() {
        let err = adapter(Duration::ZERO)
            .run(add_frame(b""), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DecodeError { .. }));
    }

    #[tokio::test]
    async fn slow_job_times_out_as_task_error() {
        let err = adapter(Duration::from_millis(300))
            .run(add_frame(b"src"), Duration::from_millis(20))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TaskError { .. }));
        assert!(!err.is_client_error());
    }
}
