//! The capture job: one page in, one PNG on disk out

use std::fs;
use std::time::Duration;

use log::{debug, info};

use crate::session::BrowserSession;
use crate::{CaptureConfig, CapturedPage, Result};

/// Capture a full-page screenshot of `config.target_url` and write it to
/// `config.output_path`.
///
/// The job runs each step exactly once, in order, and aborts on the first
/// failure:
///
/// 1. Validate the configuration (no browser or network activity happens on
///    an invalid config).
/// 2. Create the output file's parent directories.
/// 3. Launch the browser session.
/// 4. Navigate and wait for network idleness under `timeout_ms`.
/// 5. Render the full document to PNG and write the file, overwriting any
///    previous capture at the same path.
/// 6. Release the session and report the written path and on-disk size.
///
/// The browser is released on every exit path: explicitly on completion, and
/// through the session's drop behavior when a step fails. A write that fails
/// midway can leave a partial file behind; it is not cleaned up.
pub fn capture(config: &CaptureConfig) -> Result<CapturedPage> {
    let url = config.validate()?;

    if let Some(parent) = config.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    info!("capturing {} -> {}", url, config.output_path.display());

    let session = BrowserSession::launch(config)?;
    let job = run_job(&session, config, url.as_str());
    // Release runs for success and failure alike; a panic in between would
    // still reclaim the subprocess through the session's drop.
    let closed = session.close();

    let size_bytes = job?;
    closed?;

    info!(
        "captured {} ({} bytes)",
        config.output_path.display(),
        size_bytes
    );

    Ok(CapturedPage {
        path: config.output_path.clone(),
        size_bytes,
    })
}

fn run_job(session: &BrowserSession, config: &CaptureConfig, url: &str) -> Result<u64> {
    session.navigate(url, Duration::from_millis(config.timeout_ms))?;

    let png = session.capture_full_page()?;
    debug!("rendered {} bytes of PNG", png.len());

    fs::write(&config.output_path, &png)?;

    // Stat the file rather than trusting the in-memory length; this is the
    // size the caller will observe on disk.
    Ok(fs::metadata(&config.output_path)?.len())
}
