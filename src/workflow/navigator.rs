//! Navigation from the library site into the pop-up request form.

use std::sync::Arc;

use tracing::info;

use crate::browser::{BrowserDriver, BrowserError, WindowHandle};

use super::errors::SubmissionError;
use super::poller::AvailabilityPoller;
use super::selectors;

/// Drives the two-hop navigation: land on the form info page, follow the
/// form link, and move focus into the window it opens.
pub struct FormNavigator {
    driver: Arc<dyn BrowserDriver>,
    poller: AvailabilityPoller,
}

impl FormNavigator {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        let poller = AvailabilityPoller::new(driver.clone());
        Self { driver, poller }
    }

    /// Open the request form and switch focus to its window.
    ///
    /// The new window is defined as any handle absent from the pre-click
    /// window set; the contract requires exactly one such handle.
    pub async fn go_to_form(&self, form_page_url: &str) -> Result<(), SubmissionError> {
        self.poller.check_site(form_page_url).await?;

        let before = self
            .driver
            .window_handles()
            .await
            .map_err(SubmissionError::Session)?;

        let form_link = selectors::form_link();
        match self.driver.click(&form_link).await {
            Ok(()) => {}
            Err(BrowserError::ElementNotFound(locator)) => {
                return Err(SubmissionError::NavigationFailure(format!(
                    "the link to the form cannot be found ({})",
                    locator
                )));
            }
            Err(e) => return Err(SubmissionError::Session(e)),
        }

        let after = self
            .driver
            .window_handles()
            .await
            .map_err(SubmissionError::Session)?;

        let fresh: Vec<WindowHandle> = after
            .into_iter()
            .filter(|handle| !before.contains(handle))
            .collect();

        match fresh.as_slice() {
            [handle] => {
                self.driver
                    .switch_to_window(handle)
                    .await
                    .map_err(|e| SubmissionError::WindowSwitchFailure(e.to_string()))?;
                info!("Switched to the form's window");
                Ok(())
            }
            [] => Err(SubmissionError::WindowSwitchFailure(
                "no new window appeared after clicking the form link".into(),
            )),
            many => Err(SubmissionError::WindowSwitchFailure(format!(
                "expected exactly one new window, found {}",
                many.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeCall, FakeDriver};

    const FORM_PAGE: &str = "https://library.test/form-info";

    fn driver_with_popup() -> Arc<FakeDriver> {
        let original = WindowHandle::new("main");
        let popup = WindowHandle::new("form");
        Arc::new(
            FakeDriver::new()
                .with_element(&selectors::form_link())
                .with_windows(vec![original.clone()])
                .on_click_windows(&selectors::form_link(), vec![original, popup]),
        )
    }

    #[tokio::test]
    async fn test_switches_to_the_single_new_window() {
        let driver = driver_with_popup();
        let navigator = FormNavigator::new(driver.clone());

        navigator.go_to_form(FORM_PAGE).await.unwrap();

        let calls = driver.calls();
        assert!(calls.contains(&FakeCall::Switch("form".into())));
    }

    #[tokio::test]
    async fn test_missing_form_link_is_navigation_failure() {
        let driver = Arc::new(FakeDriver::new().with_windows(vec![WindowHandle::new("main")]));
        let navigator = FormNavigator::new(driver);

        let err = navigator.go_to_form(FORM_PAGE).await.unwrap_err();
        assert!(matches!(err, SubmissionError::NavigationFailure(_)));
    }

    #[tokio::test]
    async fn test_no_new_window_is_switch_failure() {
        let driver = Arc::new(
            FakeDriver::new()
                .with_element(&selectors::form_link())
                .with_windows(vec![WindowHandle::new("main")]),
        );
        let navigator = FormNavigator::new(driver);

        let err = navigator.go_to_form(FORM_PAGE).await.unwrap_err();
        assert!(matches!(err, SubmissionError::WindowSwitchFailure(_)));
    }

    #[tokio::test]
    async fn test_two_new_windows_is_switch_failure() {
        let original = WindowHandle::new("main");
        let driver = Arc::new(
            FakeDriver::new()
                .with_element(&selectors::form_link())
                .with_windows(vec![original.clone()])
                .on_click_windows(
                    &selectors::form_link(),
                    vec![
                        original,
                        WindowHandle::new("form-a"),
                        WindowHandle::new("form-b"),
                    ],
                ),
        );
        let navigator = FormNavigator::new(driver);

        let err = navigator.go_to_form(FORM_PAGE).await.unwrap_err();
        assert!(matches!(err, SubmissionError::WindowSwitchFailure(_)));
    }

    #[tokio::test]
    async fn test_error_banner_on_form_page_is_site_unreachable() {
        let driver = Arc::new(FakeDriver::new().with_element(&selectors::error_indicator()));
        let navigator = FormNavigator::new(driver.clone());

        let err = navigator.go_to_form(FORM_PAGE).await.unwrap_err();
        assert!(matches!(err, SubmissionError::SiteUnreachable(_)));
        // The form link is never looked up on an unreachable site.
        assert_eq!(driver.lookup_count(&selectors::form_link()), 0);
    }
}
