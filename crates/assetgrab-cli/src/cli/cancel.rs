//! Runs blocking work off the async runtime while Ctrl-C flips a cancel token.

use anyhow::{Context, Result};
use assetgrab_core::control::CancelToken;

/// Runs `work` on the blocking pool. The first Ctrl-C sets `cancel`; the work
/// decides when to look at it (the pipeline checks between downloads).
pub async fn run_blocking_cancellable<T, F>(cancel: CancelToken, work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!();
                eprintln!("Interrupted: finishing the current download, skipping the rest.");
                tracing::info!("ctrl-c received, cancelling batch");
                cancel.cancel();
            }
        }
    });

    let out = tokio::task::spawn_blocking(work)
        .await
        .context("worker task join");
    watcher.abort();
    out
}
