//! Async facade over the blocking capture job
//!
//! `headless_chrome` exposes a synchronous API, so the whole job runs on a
//! dedicated worker thread that owns the browser session; the caller awaits
//! the result over a oneshot channel and the host runtime never blocks on
//! navigation or rendering.

use std::thread;

use tokio::sync::oneshot;

use crate::{CaptureConfig, CapturedPage, Error, Result};

/// Run [`crate::capture`] on a worker thread and await its result.
///
/// The worker owns every browser resource for the run, so concurrent calls
/// each get an isolated browser. A worker that dies without reporting (a
/// panic mid-job) surfaces as [`Error::Unexpected`].
pub async fn capture(config: CaptureConfig) -> Result<CapturedPage> {
    let (tx, rx) = oneshot::channel();

    thread::spawn(move || {
        let _ = tx.send(crate::capture::capture(&config));
    });

    rx.await
        .map_err(|_| Error::Unexpected("Capture worker exited without a result".to_string()))?
}
