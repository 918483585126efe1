//! Scripted in-memory driver for workflow tests.
//!
//! Records every call so tests can assert lookup order, screenshot
//! attempts, and the single-close guarantee without a live browser.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    BrowserDriver, BrowserError, DriverFactory, Locator, ScreenshotArtifact, WindowHandle,
};

/// One recorded driver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Navigate(String),
    Refresh,
    Find(String),
    Click(String),
    Type(String, String),
    Windows,
    Switch(String),
    Screenshot(String),
    Close,
}

#[derive(Default)]
struct FakeState {
    /// Locators that resolve successfully.
    present: HashSet<String>,
    /// Locators that start absent and appear after N failed lookups.
    appear_after: HashMap<String, u32>,
    /// Current window set.
    windows: Vec<WindowHandle>,
    /// Window sets swapped in when a given locator is clicked.
    windows_on_click: HashMap<String, Vec<WindowHandle>>,
    calls: Vec<FakeCall>,
    close_calls: u32,
}

/// A scripted [`BrowserDriver`].
#[derive(Default)]
pub struct FakeDriver {
    state: Mutex<FakeState>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `locator` to resolve on every lookup.
    pub fn with_element(self, locator: &Locator) -> Self {
        self.state.lock().unwrap().present.insert(locator.to_string());
        self
    }

    /// Script `locator` to fail `failures` lookups, then resolve.
    pub fn with_element_after(self, locator: &Locator, failures: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .appear_after
            .insert(locator.to_string(), failures);
        self
    }

    /// Script the initial window set.
    pub fn with_windows(self, handles: Vec<WindowHandle>) -> Self {
        self.state.lock().unwrap().windows = handles;
        self
    }

    /// Script a click on `locator` to replace the window set (pop-up).
    pub fn on_click_windows(self, locator: &Locator, handles: Vec<WindowHandle>) -> Self {
        self.state
            .lock()
            .unwrap()
            .windows_on_click
            .insert(locator.to_string(), handles);
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn close_calls(&self) -> u32 {
        self.state.lock().unwrap().close_calls
    }

    pub fn screenshot_attempts(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, FakeCall::Screenshot(_)))
            .count()
    }

    /// Number of lookups performed against `locator` (find, click, type).
    pub fn lookup_count(&self, locator: &Locator) -> usize {
        let key = locator.to_string();
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| match c {
                FakeCall::Find(l) | FakeCall::Click(l) | FakeCall::Type(l, _) => *l == key,
                _ => false,
            })
            .count()
    }

    fn lookup(state: &mut FakeState, key: &str) -> Result<(), BrowserError> {
        if let Some(remaining) = state.appear_after.get_mut(key) {
            if *remaining == 0 {
                state.appear_after.remove(key);
                state.present.insert(key.to_string());
                return Ok(());
            }
            *remaining -= 1;
            return Err(BrowserError::ElementNotFound(key.to_string()));
        }
        if state.present.contains(key) {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(key.to_string()))
        }
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(FakeCall::Navigate(url.to_string()));
        Ok(())
    }

    async fn refresh(&self) -> Result<(), BrowserError> {
        self.state.lock().unwrap().calls.push(FakeCall::Refresh);
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let key = locator.to_string();
        state.calls.push(FakeCall::Find(key.clone()));
        Self::lookup(&mut state, &key)
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let key = locator.to_string();
        state.calls.push(FakeCall::Click(key.clone()));
        Self::lookup(&mut state, &key)?;
        if let Some(windows) = state.windows_on_click.remove(&key) {
            state.windows = windows;
        }
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let key = locator.to_string();
        state.calls.push(FakeCall::Type(key.clone(), value.to_string()));
        Self::lookup(&mut state, &key)
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>, BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(FakeCall::Windows);
        Ok(state.windows.clone())
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(FakeCall::Switch(handle.to_string()));
        if state.windows.contains(handle) {
            Ok(())
        } else {
            Err(BrowserError::WindowNotFound(handle.to_string()))
        }
    }

    async fn screenshot(&self, step: &str) -> Option<ScreenshotArtifact> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(FakeCall::Screenshot(step.to_string()));
        None
    }

    async fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(FakeCall::Close);
        state.close_calls += 1;
    }
}

/// Hands out pre-scripted drivers in order; errors once the script runs dry.
pub struct FakeFactory {
    drivers: Mutex<VecDeque<Arc<FakeDriver>>>,
    created: Mutex<usize>,
}

impl FakeFactory {
    pub fn new(drivers: Vec<Arc<FakeDriver>>) -> Self {
        Self {
            drivers: Mutex::new(drivers.into()),
            created: Mutex::new(0),
        }
    }

    /// How many sessions were requested.
    pub fn created(&self) -> usize {
        *self.created.lock().unwrap()
    }
}

#[async_trait]
impl DriverFactory for FakeFactory {
    async fn create(&self) -> Result<Arc<dyn BrowserDriver>, BrowserError> {
        *self.created.lock().unwrap() += 1;
        self.drivers
            .lock()
            .unwrap()
            .pop_front()
            .map(|d| d as Arc<dyn BrowserDriver>)
            .ok_or_else(|| BrowserError::ConnectFailed("no scripted driver left".into()))
    }
}
