use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppResult;
use domain::image::{BackgroundCoefficient, CompositeResult, Quality};

#[derive(Debug, Clone)]
pub enum CompositeJob {
    AddFrame {
        source: Vec<u8>,
        overlay: Vec<u8>,
        quality: Quality,
    },
    WhiteBackground {
        source: Vec<u8>,
        coefficient: BackgroundCoefficient,
    },
}

impl CompositeJob {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddFrame { .. } => "add_frame",
            Self::WhiteBackground { .. } => "white_background",
        }
    }
}

/// Runs compositor jobs off the async runtime, failing with a task error past `deadline`.
pub trait BlockingCompositorPort: Send + Sync {
    fn run(
        &self,
        job: CompositeJob,
        deadline: Duration,
    ) -> Pin<Box<dyn Future<Output = AppResult<CompositeResult>> + Send + 'static>>;
}

pub type DynBlockingCompositorPort = Arc<dyn BlockingCompositorPort>;
