//! Element locators and window/screenshot value types.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};

/// An expression identifying one element within the current page.
///
/// `LinkText` mirrors the anchor-text lookup the target site is navigated
/// by; it is rendered to an exact-match XPath when resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector.
    Css(String),
    /// Raw XPath expression.
    XPath(String),
    /// Exact visible text of an anchor element.
    LinkText(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// XPath form of this locator, or `None` for CSS selectors.
    pub fn as_xpath(&self) -> Option<String> {
        match self {
            Self::Css(_) => None,
            Self::XPath(expr) => Some(expr.clone()),
            Self::LinkText(text) => Some(format!(
                "//a[normalize-space(.)={}]",
                escape_xpath_string(text)
            )),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(sel) => write!(f, "css={}", sel),
            Self::XPath(expr) => write!(f, "xpath={}", expr),
            Self::LinkText(text) => write!(f, "link-text={}", text),
        }
    }
}

/// Quote a literal for embedding in an XPath expression.
///
/// Strings containing single quotes are split and rejoined with `concat()`,
/// since XPath 1.0 has no escape syntax inside string literals.
pub fn escape_xpath_string(s: &str) -> String {
    if s.contains('\'') {
        let parts: Vec<_> = s.split('\'').collect();
        format!("concat('{}')", parts.join("',\"'\",'"))
    } else {
        format!("'{}'", s)
    }
}

/// Opaque identifier for one browser tab/window within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub String);

impl WindowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved screenshot, named after the workflow step that captured it.
///
/// Write-only side effect: nothing reads these back, they exist so an
/// operator can inspect what the form looked like at fill and submit time.
#[derive(Debug, Clone)]
pub struct ScreenshotArtifact {
    pub path: PathBuf,
    pub step: String,
    pub captured_at: DateTime<Local>,
}
