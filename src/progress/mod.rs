//! Progress reporting and cooperative cancellation.
//!
//! Long-running operations drive a [`ProgressSink`] from a worker task while
//! any other thread may observe it or request cancellation. The sink is the
//! only synchronization point between the two sides.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// A single progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Work is happening but its extent is unknown.
    Indeterminate,
    /// Completion in percent, `0..=100`.
    Percent(u8),
}

/// Receives progress from an operation and tells it when to stop.
pub trait ProgressSink: Send + Sync {
    /// Indeterminate pulse.
    fn notify(&self);

    fn notify_percent(&self, percent: u8);

    /// Polled by the operation between units of work.
    fn is_cancelled(&self) -> bool;
}

/// A sink that ignores updates and is never cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&self) {}

    fn notify_percent(&self, _percent: u8) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

type Callback = dyn Fn(Progress) + Send + Sync;

const NO_PERCENT: u8 = u8::MAX;

struct Inner {
    cancelled: AtomicBool,
    percent: AtomicU8,
    callback: Option<Box<Callback>>,
}

/// Thread-safe sink: an atomic cancel flag, the last reported percentage and
/// an optional callback invoked on every update.
///
/// Clones share state, so one clone can be handed to a worker while another
/// stays with the observer.
#[derive(Clone)]
pub struct ProgressHandle {
    inner: Arc<Inner>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        Self::build(Some(Box::new(callback)))
    }

    fn build(callback: Option<Box<Callback>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                percent: AtomicU8::new(NO_PERCENT),
                callback,
            }),
        }
    }

    /// Request cancellation. The running operation stops at its next check.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Last reported percentage, if any was reported.
    pub fn percent(&self) -> Option<u8> {
        match self.inner.percent.load(Ordering::SeqCst) {
            NO_PERCENT => None,
            p => Some(p),
        }
    }

    fn emit(&self, progress: Progress) {
        if let Some(callback) = &self.inner.callback {
            callback(progress);
        }
    }
}

impl Default for ProgressHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProgressHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressHandle")
            .field("cancelled", &self.is_cancelled())
            .field("percent", &self.percent())
            .finish()
    }
}

impl ProgressSink for ProgressHandle {
    fn notify(&self) {
        self.emit(Progress::Indeterminate);
    }

    fn notify_percent(&self, percent: u8) {
        let percent = percent.min(100);
        self.inner.percent.store(percent, Ordering::SeqCst);
        self.emit(Progress::Percent(percent));
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}
