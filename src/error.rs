//! Error types for the capture job

use thiserror::Error;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the capture job
///
/// The set is closed so callers branch on the failure kind instead of
/// string-matching messages. Every variant is fatal for the run: nothing is
/// recovered internally and nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration; raised before any browser resource is acquired
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Browser session failed to start (missing executable, launch or page
    /// setup failure)
    #[error("Browser session failed: {0}")]
    Resource(String),

    /// Navigation did not settle within the configured budget
    #[error("Navigation to {url} timed out after {elapsed_ms}ms (budget {timeout_ms}ms)")]
    NavigationTimeout {
        /// The URL whose navigation timed out
        url: String,
        /// Milliseconds elapsed when the job gave up
        elapsed_ms: u64,
        /// The configured budget
        timeout_ms: u64,
    },

    /// Target host unreachable or DNS resolution failed
    #[error("Network error: {0}")]
    Network(String),

    /// Output directory could not be created or the file could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything not classified above
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Returns `true` if this is a navigation timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NavigationTimeout { .. })
    }

    /// Returns `true` if the failure happened before a browser was launched.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// `headless_chrome` reports failures as `anyhow::Error`; errors that are not
// classified at the call site fall through to the catch-all variant.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}
