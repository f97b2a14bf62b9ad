//! Headless Chrome session adapter
//!
//! Wraps the `headless_chrome` crate as a black-box browser collaborator:
//! launch a sandboxless headless Chrome sized to the viewport, configure the
//! tab, navigate with a network-idle wait, and render the full document.
//!
//! Release discipline: the underlying `Browser` handle terminates the Chrome
//! child process when dropped, so the subprocess is reclaimed on every exit
//! path even when a step in the middle of the job fails. [`BrowserSession::close`]
//! exists for the explicit happy-path release.

use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use serde_json::Value;

use crate::{CaptureConfig, Error, Result, Viewport};

/// Continuous quiet period after which the network is judged idle.
const IDLE_QUIET: Duration = Duration::from_millis(500);

/// Interval between idle probes.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Slack added to the browser-side idle timeout so Chrome is not torn down
/// underneath a navigation that is still inside the configured budget.
const BROWSER_TIMEOUT_GRACE: Duration = Duration::from_secs(10);

/// A live headless Chrome session with a single configured tab
pub struct BrowserSession {
    browser: Browser,
    tab: Arc<Tab>,
    viewport: Viewport,
}

impl BrowserSession {
    /// Launch a headless browser and prepare one tab for capture.
    ///
    /// Sandboxing and GPU acceleration are disabled so the browser starts in
    /// constrained container environments; the window is sized to the
    /// configured viewport and the user-agent override is applied before any
    /// navigation. Every failure in here maps to [`Error::Resource`].
    pub fn launch(config: &CaptureConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .idle_browser_timeout(timeout + BROWSER_TIMEOUT_GRACE)
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-accelerated-2d-canvas"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--no-first-run"),
                OsStr::new("--no-zygote"),
            ])
            .build()
            .map_err(|e| Error::Resource(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Resource(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Resource(format!("Failed to create tab: {}", e)))?;

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| Error::Resource(format!("Failed to set user agent: {}", e)))?;

        tab.set_default_timeout(timeout);

        debug!(
            "browser session up, viewport {}x{}",
            config.viewport.width, config.viewport.height
        );

        Ok(Self {
            browser,
            tab,
            viewport: config.viewport,
        })
    }

    /// Navigate to `url` and block until the network is judged idle or the
    /// budget elapses, whichever comes first.
    ///
    /// Idleness is a heuristic: the page must report `document.readyState`
    /// of `complete` and its resource-entry count must hold still for a
    /// continuous [`IDLE_QUIET`] window. On budget exhaustion the error is
    /// [`Error::NavigationTimeout`] with the URL and elapsed time; an
    /// unreachable host or failed DNS lookup surfaces as [`Error::Network`].
    pub fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        let deadline = started + timeout;

        self.tab
            .navigate_to(url)
            .map_err(|e| classify_navigation_error(e, url, started, timeout))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| classify_navigation_error(e, url, started, timeout))?;

        self.wait_for_network_idle(url, started, deadline, timeout)?;

        debug!("navigation settled after {}ms", started.elapsed().as_millis());
        Ok(())
    }

    fn wait_for_network_idle(
        &self,
        url: &str,
        started: Instant,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<()> {
        let mut last_count = self.resource_count();
        let mut quiet_since = Instant::now();

        loop {
            if self.ready_state_complete() {
                let count = self.resource_count();
                match (count, last_count) {
                    (Some(now), Some(before)) if now == before => {
                        if quiet_since.elapsed() >= IDLE_QUIET {
                            return Ok(());
                        }
                    }
                    _ => {
                        last_count = count;
                        quiet_since = Instant::now();
                    }
                }
            } else {
                quiet_since = Instant::now();
            }

            if Instant::now() + IDLE_POLL >= deadline {
                return Err(Error::NavigationTimeout {
                    url: url.to_string(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    timeout_ms: timeout.as_millis() as u64,
                });
            }

            thread::sleep(IDLE_POLL);
        }
    }

    /// Render the entire scrollable document as a lossless PNG.
    ///
    /// The clip spans the configured viewport width and the full document
    /// height, so full-page capture only ever grows the image downward.
    pub fn capture_full_page(&self) -> Result<Vec<u8>> {
        let viewport_height = f64::from(self.viewport.height);
        let document_height = self
            .document_height()
            .unwrap_or(viewport_height)
            .max(viewport_height);

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: f64::from(self.viewport.width),
            height: document_height,
            scale: 1.0,
        };

        debug!(
            "capturing {}x{} document",
            self.viewport.width, document_height as u64
        );

        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::Unexpected(format!("Screenshot failed: {}", e)))
    }

    /// Release the session, terminating the Chrome child process.
    pub fn close(self) -> Result<()> {
        // Dropping the handles tears the child process down; keep the tab
        // alive no longer than the browser that owns it.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }

    fn document_height(&self) -> Option<f64> {
        self.probe(
            "Math.max(document.documentElement.scrollHeight, \
             document.body ? document.body.scrollHeight : 0)",
        )?
        .as_f64()
    }

    fn resource_count(&self) -> Option<i64> {
        self.probe("window.performance.getEntriesByType('resource').length")?
            .as_i64()
    }

    fn ready_state_complete(&self) -> bool {
        self.probe("document.readyState")
            .and_then(|v| v.as_str().map(|s| s == "complete"))
            .unwrap_or(false)
    }

    /// Evaluate a read-only expression in the page; probe failures are noisy
    /// but never fatal, the idle loop treats them as continued activity.
    fn probe(&self, expression: &str) -> Option<Value> {
        match self.tab.evaluate(expression, false) {
            Ok(object) => object.value,
            Err(err) => {
                warn!("page probe failed: {}", err);
                None
            }
        }
    }
}

/// Map a `headless_chrome` navigation failure onto the capture taxonomy.
///
/// Chrome reports unreachable hosts and failed DNS lookups through
/// `net::ERR_*` error text; anything else that surfaces after the budget has
/// elapsed is a timeout, and the remainder is unclassified.
fn classify_navigation_error(
    err: anyhow::Error,
    url: &str,
    started: Instant,
    timeout: Duration,
) -> Error {
    let message = err.to_string();

    if message.contains("net::ERR_NAME_NOT_RESOLVED")
        || message.contains("net::ERR_CONNECTION")
        || message.contains("net::ERR_ADDRESS")
        || message.contains("net::ERR_INTERNET_DISCONNECTED")
    {
        return Error::Network(format!("{} unreachable: {}", url, message));
    }

    // The tab's own wait timer is set to the same budget and can fire a tick
    // before our clock does; treat its timeout message as budget exhaustion.
    if started.elapsed() >= timeout
        || message.contains("The event waited for never came")
        || message.contains("Timed out")
    {
        return Error::NavigationTimeout {
            url: url.to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            timeout_ms: timeout.as_millis() as u64,
        };
    }

    Error::Unexpected(format!("Navigation failed: {}", message))
}
