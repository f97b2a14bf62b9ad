//! Pageshot
//!
//! Captures a full-page screenshot of a single web page with a headless
//! Chrome/Chromium browser and writes the result to a PNG file.
//!
//! One capture job runs per invocation: validate the configuration, create
//! the output directory, launch a browser session, configure the page,
//! navigate and wait for the network to go idle, render the entire scrollable
//! document, write the file, release the session. No state survives between
//! invocations and nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use pageshot::{CaptureConfig, Viewport};
//!
//! # fn main() -> Result<(), pageshot::Error> {
//! let config = CaptureConfig {
//!     target_url: "https://example.com".to_string(),
//!     output_path: "./ss/screenshot.png".into(),
//!     viewport: Viewport { width: 1920, height: 1080 },
//!     ..Default::default()
//! };
//!
//! let shot = pageshot::capture(&config)?;
//! println!("{} ({} bytes)", shot.path.display(), shot.size_bytes);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use url::Url;

pub mod error;
pub use error::{Error, Result};

pub mod session;

pub mod capture;
pub use capture::capture;

// Async-friendly facade backed by a dedicated worker thread
pub mod async_api;

/// Browser identity sent with every capture to reduce bot-detection false
/// negatives.
///
/// The version segment is a pinned literal and goes stale as real Chrome
/// moves on; updating it is routine maintenance, not a bug fix.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.7258.67 Safari/537.36";

/// Configuration for a single capture job
///
/// The config is an explicit value passed into [`capture`]; there is no
/// ambient global state, so repeated or concurrent invocations with their own
/// configs are independent (each spawns its own isolated browser).
///
/// # Examples
///
/// ```
/// let cfg = pageshot::CaptureConfig::default();
/// assert_eq!(cfg.viewport.width, 1920);
/// ```
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Page to render; must parse as an absolute http(s) URL
    pub target_url: String,
    /// Destination for the PNG image; parent directories are created on demand
    pub output_path: PathBuf,
    /// Rendering surface dimensions
    pub viewport: Viewport,
    /// Maximum time to wait for navigation to settle, in milliseconds
    pub timeout_ms: u64,
    /// User-agent override applied to the page before navigation
    pub user_agent: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_url: "https://news.google.com/home".to_string(),
            output_path: PathBuf::from("ss/screenshot.png"),
            viewport: Viewport::default(),
            timeout_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CaptureConfig {
    /// Validate the configuration without touching any browser resource.
    ///
    /// Returns the parsed target URL on success so callers navigate with the
    /// normalized form.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.target_url)
            .map_err(|e| Error::Config(format!("Invalid URL '{}': {}", self.target_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "Unsupported URL scheme '{}': expected http or https",
                url.scheme()
            )));
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::Config(format!(
                "Viewport dimensions must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }

        if self.timeout_ms == 0 {
            return Err(Error::Config("Navigation timeout must be positive".to_string()));
        }

        Ok(url)
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Success report for a finished capture
///
/// `size_bytes` is read back from the filesystem after the write, so it is
/// the size the caller will observe on disk.
#[derive(Debug, Clone)]
pub struct CapturedPage {
    /// Path the PNG was written to
    pub path: PathBuf,
    /// Size of the written file in bytes
    pub size_bytes: u64,
}
