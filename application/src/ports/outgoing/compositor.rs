use std::sync::Arc;

use crate::error::AppResult;
use domain::image::{BackgroundCoefficient, CompositeResult, Quality};

/// Synchronous, CPU-bound image work. Implementations hold no shared mutable state.
pub trait CompositorPort: Send + Sync {
    /// Overlays `overlay` onto `source`, preserving the source's mode, metadata and format.
    fn composite(
        &self,
        source: &[u8],
        overlay: &[u8],
        quality: Quality,
    ) -> AppResult<CompositeResult>;

    /// Centers `source` on a white canvas `coefficient` times larger.
    fn pad_white(
        &self,
        source: &[u8],
        coefficient: BackgroundCoefficient,
    ) -> AppResult<CompositeResult>;
}

pub type DynCompositorPort = Arc<dyn CompositorPort>;
