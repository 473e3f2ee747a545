use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Conversion progress sink, called with an integer percentage after each
/// completed track.
pub type ProgressCallback = Arc<dyn Fn(u32) + Send + Sync>;

/// Cooperative cancellation flag shared between a conversion and whoever
/// issued it. Checked at track and batch granularity only, so output files
/// are only ever torn at batch boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
