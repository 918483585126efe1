//! Driver trait for a remote browser session.
//!
//! The workflow only ever talks to `dyn BrowserDriver`, so tests can swap in
//! a scripted fake and the CDP client stays a leaf concern.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BrowserError, Locator, ScreenshotArtifact, WindowHandle};

/// Capability surface of one live remote browser session.
///
/// Actions are addressed by locator and resolve on every call; a reference
/// that has gone stale therefore surfaces as `ElementNotFound` on the next
/// action. Lookups never retry internally — retry policy belongs to the
/// caller.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Load a URL in the active window.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Reload the active window.
    async fn refresh(&self) -> Result<(), BrowserError>;

    /// Probe for a single element. `ElementNotFound` when absent.
    async fn find_element(&self, locator: &Locator) -> Result<(), BrowserError>;

    /// Resolve an element and click it.
    async fn click(&self, locator: &Locator) -> Result<(), BrowserError>;

    /// Resolve an element and type text into it.
    async fn type_text(&self, locator: &Locator, value: &str) -> Result<(), BrowserError>;

    /// Enumerate all window handles in the session.
    async fn window_handles(&self) -> Result<Vec<WindowHandle>, BrowserError>;

    /// Move focus to the given window.
    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<(), BrowserError>;

    /// Best-effort capture of the active window. Returns `None` on failure;
    /// a failed screenshot must never abort the workflow.
    async fn screenshot(&self, step: &str) -> Option<ScreenshotArtifact>;

    /// Terminate the remote session. Idempotent.
    async fn close(&self);
}

/// Creates one fresh session per workflow run.
///
/// Sessions are never pooled or reused across records; each record gets a
/// clean browser so cookies, windows, and element state cannot leak between
/// users.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn BrowserDriver>, BrowserError>;
}
