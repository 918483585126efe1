//! Remote browser session over the Chrome DevTools protocol.
//!
//! Connects to an already-running browser (e.g. a standalone Chrome
//! container) through its DevTools websocket endpoint. One client owns one
//! session for the lifetime of one workflow run.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, ReloadParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Element, Page};
use chrono::Local;
use futures::StreamExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{
    BrowserDriver, BrowserError, DriverFactory, Locator, ScreenshotArtifact, WindowHandle,
};

/// A live remote browser session.
pub struct CdpBrowserClient {
    /// The connected browser instance.
    browser: RwLock<Option<Browser>>,
    /// Page currently holding focus.
    page: RwLock<Option<Page>>,
    /// Cleared when the event handler ends (remote side disconnected).
    alive: Arc<AtomicBool>,
    /// Set on the first `close()` call.
    closed: AtomicBool,
    /// Where screenshot artifacts are written.
    screenshot_dir: PathBuf,
}

impl CdpBrowserClient {
    /// Connect to the remote browser at `addr`.
    ///
    /// `addr` is either a `host:port` DevTools address (the websocket URL is
    /// discovered via `GET /json/version`) or a full `ws://` URL used
    /// verbatim.
    pub async fn connect(
        addr: &str,
        screenshot_dir: PathBuf,
    ) -> Result<Self, BrowserError> {
        let ws_url = resolve_ws_url(addr).await?;
        info!("Connecting to remote browser at {}", ws_url);

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| BrowserError::ConnectFailed(e.to_string()))?;

        // Drain browser events until the remote side disconnects.
        let alive = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            warn!("Remote browser disconnected (event handler ended)");
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        // Adopt the browser's existing tab as the active window, or open a
        // blank one if the session came up empty.
        let page = {
            let mut pages = browser
                .pages()
                .await
                .map_err(|e| BrowserError::ConnectFailed(e.to_string()))?;

            if !pages.is_empty() {
                pages.remove(0)
            } else {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| BrowserError::ConnectFailed(e.to_string()))?
            }
        };

        info!("Remote browser session established");

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            page: RwLock::new(Some(page)),
            alive,
            closed: AtomicBool::new(false),
            screenshot_dir,
        })
    }

    /// Clone of the focused page, or `SessionFailure` once the session is
    /// gone.
    async fn active_page(&self) -> Result<Page, BrowserError> {
        if !self.alive.load(Ordering::Relaxed) {
            return Err(BrowserError::SessionFailure(
                "remote browser disconnected".into(),
            ));
        }
        let page = self.page.read().await;
        page.clone()
            .ok_or_else(|| BrowserError::SessionFailure("no active page".into()))
    }

    /// Resolve a locator to an element in the focused page.
    async fn resolve(&self, locator: &Locator) -> Result<Element, BrowserError> {
        let page = self.active_page().await?;
        let found = match locator.as_xpath() {
            Some(xpath) => page.find_xpath(xpath).await,
            None => match locator {
                Locator::Css(selector) => page.find_element(selector.as_str()).await,
                _ => unreachable!("non-CSS locators always render to XPath"),
            },
        };
        found.map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", locator, e)))
    }
}

#[async_trait]
impl BrowserDriver for CdpBrowserClient {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let page = self.active_page().await?;
        debug!("Navigating to {}", url);
        page.goto(url)
            .await
            .map_err(|e| BrowserError::SessionFailure(format!("navigate to {}: {}", url, e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| BrowserError::SessionFailure(format!("load of {}: {}", url, e)))?;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), BrowserError> {
        let page = self.active_page().await?;
        page.execute(ReloadParams::default())
            .await
            .map_err(|e| BrowserError::SessionFailure(format!("reload: {}", e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| BrowserError::SessionFailure(format!("reload: {}", e)))?;
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.resolve(locator).await.map(|_| ())
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        let element = self.resolve(locator).await?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::SessionFailure(format!("click {}: {}", locator, e)))?;
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        let element = self.resolve(locator).await?;
        // Click first so the input has focus before keystrokes arrive.
        let _ = element.click().await;
        element
            .type_str(value)
            .await
            .map_err(|e| BrowserError::SessionFailure(format!("type into {}: {}", locator, e)))?;
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>, BrowserError> {
        let browser = self.browser.read().await;
        let browser = browser
            .as_ref()
            .ok_or_else(|| BrowserError::SessionFailure("session closed".into()))?;

        let pages = browser
            .pages()
            .await
            .map_err(|e| BrowserError::SessionFailure(format!("list windows: {}", e)))?;

        Ok(pages
            .iter()
            .map(|p| WindowHandle::new(p.target_id().inner().clone()))
            .collect())
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<(), BrowserError> {
        let target = {
            let browser = self.browser.read().await;
            let browser = browser
                .as_ref()
                .ok_or_else(|| BrowserError::SessionFailure("session closed".into()))?;

            let pages = browser
                .pages()
                .await
                .map_err(|e| BrowserError::SessionFailure(format!("list windows: {}", e)))?;

            pages
                .into_iter()
                .find(|p| p.target_id().inner() == &handle.0)
        };

        match target {
            Some(page) => {
                page.bring_to_front()
                    .await
                    .map_err(|e| BrowserError::SessionFailure(format!("focus window: {}", e)))?;
                *self.page.write().await = Some(page);
                debug!("Switched to window {}", handle);
                Ok(())
            }
            None => Err(BrowserError::WindowNotFound(handle.to_string())),
        }
    }

    async fn screenshot(&self, step: &str) -> Option<ScreenshotArtifact> {
        let captured_at = Local::now();
        let filename = format!(
            "screenshot_{}_{}.png",
            step,
            captured_at.format("%H-%M-%S_%d-%m-%Y")
        );
        let path = self.screenshot_dir.join(filename);

        let page = match self.active_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!("Error while saving a screenshot: {}", e);
                return None;
            }
        };

        if let Err(e) = std::fs::create_dir_all(&self.screenshot_dir) {
            warn!(
                "Error while saving a screenshot: cannot create {}: {}",
                self.screenshot_dir.display(),
                e
            );
            return None;
        }

        let params = ScreenshotParams {
            cdp_params: CaptureScreenshotParams {
                format: Some(CaptureScreenshotFormat::Png),
                ..CaptureScreenshotParams::default()
            },
            full_page: Some(true),
            omit_background: Some(false),
        };

        match page.save_screenshot(params, &path).await {
            Ok(_) => {
                debug!("Screenshot saved at {}", path.display());
                Some(ScreenshotArtifact {
                    path,
                    step: step.to_string(),
                    captured_at,
                })
            }
            Err(e) => {
                warn!("Error while saving a screenshot: {}", e);
                None
            }
        }
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.alive.store(false, Ordering::Relaxed);

        // Close the page first, then the browser connection.
        {
            let mut page = self.page.write().await;
            if let Some(p) = page.take() {
                let _ = p.close().await;
            }
        }
        {
            let mut browser = self.browser.write().await;
            if let Some(mut b) = browser.take() {
                let _ = b.close().await;
            }
        }

        info!("Remote browser session closed");
    }
}

/// Resolve the DevTools websocket URL for a configured address.
async fn resolve_ws_url(addr: &str) -> Result<String, BrowserError> {
    if addr.starts_with("ws://") || addr.starts_with("wss://") {
        return Ok(addr.to_string());
    }

    let base = if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", addr.trim_end_matches('/'))
    };

    let version_url = url::Url::parse(&format!("{}/json/version", base))
        .map_err(|e| BrowserError::ConnectFailed(format!("bad remote address {}: {}", addr, e)))?;

    let response = reqwest::get(version_url.clone())
        .await
        .map_err(|e| BrowserError::ConnectFailed(format!("query {}: {}", version_url, e)))?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| BrowserError::ConnectFailed(format!("parse {}: {}", version_url, e)))?;

    body.get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            BrowserError::ConnectFailed(format!("no webSocketDebuggerUrl at {}", version_url))
        })
}

/// Connects one fresh CDP session per workflow run.
pub struct CdpDriverFactory {
    remote_addr: String,
    screenshot_dir: PathBuf,
}

impl CdpDriverFactory {
    pub fn new(remote_addr: impl Into<String>, screenshot_dir: PathBuf) -> Self {
        Self {
            remote_addr: remote_addr.into(),
            screenshot_dir,
        }
    }
}

#[async_trait]
impl DriverFactory for CdpDriverFactory {
    async fn create(&self) -> Result<Arc<dyn BrowserDriver>, BrowserError> {
        let client =
            CdpBrowserClient::connect(&self.remote_addr, self.screenshot_dir.clone()).await?;
        Ok(Arc::new(client))
    }
}
