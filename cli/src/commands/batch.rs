use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::{input::read_upload, output};
use framer_application::error::{AppError, AppResult};
use framer_application::ports::incoming::framing::{FramedImage, Upload};

fn log_failure(path: &Path, e: &AppError) {
    if e.is_client_error() {
        warn!(input = %path.display(), error = %e, "Input rejected");
    } else {
        error!(input = %path.display(), error = %e, "Input failed");
    }
}

/// Keeps the first server error, otherwise the last client error.
fn most_severe(failures: Vec<AppError>) -> Option<AppError> {
    failures.into_iter().reduce(|kept, next| {
        if kept.is_client_error() && !next.is_client_error() {
            next
        } else {
            kept
        }
    })
}

/// Runs `job` on every input concurrently and emits the successes in input order.
pub(crate) async fn process_all<F, Fut>(inputs: &[PathBuf], job: F) -> AppResult<()>
where
    F: Fn(Upload) -> Fut,
    Fut: Future<Output = AppResult<FramedImage>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut failures = Vec::new();

    for (index, path) in inputs.iter().enumerate() {
        match read_upload(path).await {
            Ok(upload) => {
                let pending = job(upload);
                tasks.spawn(async move { (index, pending.await) });
            }
            Err(e) => {
                log_failure(path, &e);
                failures.push(e);
            }
        }
    }

    let mut framed = Vec::with_capacity(inputs.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| AppError::TaskError {
            message: format!("Processing task failed: {e}"),
        })?;
        match result {
            Ok(image) => {
                info!(input = index, key = %image.object_key, "Input processed");
                framed.push((index, image));
            }
            Err(e) => {
                if let Some(path) = inputs.get(index) {
                    log_failure(path, &e);
                }
                failures.push(e);
            }
        }
    }

    framed.sort_by_key(|(index, _)| *index);
    let framed: Vec<FramedImage> = framed.into_iter().map(|(_, image)| image).collect();
    output::emit(&framed)?;

    match most_severe(failures) {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
