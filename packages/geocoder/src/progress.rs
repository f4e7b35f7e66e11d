//! Progress reporting for road-name resolution passes.
//!
//! Resolution walks every unnamed record once, so progress is a simple
//! counter. The CLI renders it with `indicatif`; tests and non-interactive
//! runs use [`NullProgress`] or [`LogProgress`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives progress from a resolution pass.
///
/// Shared as `Arc<dyn ProgressCallback>`, so implementations must be
/// `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// Number of records that will be resolved.
    fn set_total(&self, total: u64);

    /// `delta` more records resolved.
    fn inc(&self, delta: u64);

    fn set_message(&self, msg: String);

    /// The pass finished; `msg` summarizes it.
    fn finish(&self, msg: String);

    /// The pass finished and needs no summary.
    fn finish_and_clear(&self);
}

/// Ignores everything.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Logs at `info` every `every` records and on finish. For runs without a
/// terminal to draw bars on.
pub struct LogProgress {
    every: u64,
    done: AtomicU64,
    total: AtomicU64,
}

impl LogProgress {
    #[must_use]
    pub fn new(every: u64) -> Arc<dyn ProgressCallback> {
        Arc::new(Self {
            every: every.max(1),
            done: AtomicU64::new(0),
            total: AtomicU64::new(0),
        })
    }

    fn position(&self) -> (u64, u64) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

impl ProgressCallback for LogProgress {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    fn inc(&self, delta: u64) {
        let before = self.done.fetch_add(delta, Ordering::Relaxed);
        let after = before + delta;
        if after / self.every > before / self.every {
            let (_, total) = self.position();
            log::info!("Resolved {after}/{total} road names");
        }
    }

    fn set_message(&self, msg: String) {
        log::info!("{msg}");
    }

    fn finish(&self, msg: String) {
        let (done, total) = self.position();
        log::info!("Road names done ({done}/{total}): {msg}");
    }

    fn finish_and_clear(&self) {}
}
