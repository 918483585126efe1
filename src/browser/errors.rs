//! Browser error types

use thiserror::Error;

/// Failures surfaced by the remote browser client.
///
/// `ElementNotFound` always carries the rendered locator so the logs can
/// tell which lookup went stale after a site redesign.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to connect to remote browser: {0}")]
    ConnectFailed(String),

    #[error("Remote session failure: {0}")]
    SessionFailure(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Window not found: {0}")]
    WindowNotFound(String),
}
