use anyhow::{Context, Result};
use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::progress::{Progress, ProgressHandle};

pub mod config;
mod install;
mod java;
mod list;
mod paths;
mod platform;
mod remove;
pub mod services;

pub use install::install;
pub use java::{install_runtime, runtimes};
pub use list::{list, path};
pub use platform::platform;
pub use remove::remove;

/// A progress handle that draws `<label>: NN%` on stderr.
pub(crate) fn terminal_progress(label: String) -> ProgressHandle {
    let last = AtomicU8::new(u8::MAX);
    ProgressHandle::with_callback(move |progress| {
        let mut stderr = std::io::stderr();
        match progress {
            Progress::Percent(p) => {
                if last.swap(p, Ordering::Relaxed) != p {
                    let _ = write!(stderr, "\r{}: {:>3}%", label, p);
                    if p == 100 {
                        let _ = writeln!(stderr);
                    }
                }
            }
            Progress::Indeterminate => {
                let _ = writeln!(stderr, "\r{}: unpacking...", label);
            }
        }
        let _ = stderr.flush();
    })
}

/// Runs `task` on a worker task. Ctrl-C cancels `progress` so the task can
/// stop at its next check.
pub(crate) async fn run_cancellable<F, T>(progress: &ProgressHandle, task: F) -> Result<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let cancel = progress.clone();
    let ctrl_c_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cancelling...");
            cancel.cancel();
        }
    });

    let result = tokio::spawn(task).await.context("Worker task failed");

    ctrl_c_handler.abort();
    result
}
