//! Availability polling for the monthly form release.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::browser::{BrowserDriver, BrowserError, Locator};

use super::errors::SubmissionError;
use super::selectors;

/// Bounded fixed-interval availability check.
///
/// The checked condition is a monthly form release, which gains nothing
/// from jitter or exponential backoff, so the retry interval is constant.
pub struct AvailabilityPoller {
    driver: Arc<dyn BrowserDriver>,
}

impl AvailabilityPoller {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }

    /// Navigate to `url` and verify it loads without the error indicator.
    ///
    /// The site keeps answering 200 while down and renders an error banner
    /// instead; a banner on load signals a site-level fault and is fatal
    /// immediately — "form not yet published" is a different condition,
    /// handled by [`wait_until_available`](Self::wait_until_available).
    pub async fn check_site(&self, url: &str) -> Result<(), SubmissionError> {
        self.driver
            .navigate(url)
            .await
            .map_err(SubmissionError::Session)?;

        match self.driver.find_element(&selectors::error_indicator()).await {
            Ok(()) => Err(SubmissionError::SiteUnreachable(url.to_string())),
            Err(BrowserError::ElementNotFound(_)) => {
                info!("Moved to site: {}", url);
                Ok(())
            }
            Err(e) => Err(SubmissionError::Session(e)),
        }
    }

    /// Refresh the page and probe for `landmark` until it appears.
    ///
    /// Performs at most `max_attempts` lookups, sleeping `interval` between
    /// consecutive attempts and not after the last one. Returns on the
    /// first successful lookup.
    pub async fn wait_until_available(
        &self,
        landmark: &Locator,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<(), SubmissionError> {
        for attempt in 1..=max_attempts {
            self.driver
                .refresh()
                .await
                .map_err(SubmissionError::Session)?;

            match self.driver.find_element(landmark).await {
                Ok(()) => {
                    info!("The form is available (attempt {}/{})", attempt, max_attempts);
                    return Ok(());
                }
                Err(BrowserError::ElementNotFound(_)) => {
                    if attempt < max_attempts {
                        warn!(
                            "The form is still unavailable, waiting {}s to retry ({}/{})",
                            interval.as_secs_f64(),
                            attempt,
                            max_attempts
                        );
                        sleep(interval).await;
                    }
                }
                Err(e) => return Err(SubmissionError::Session(e)),
            }
        }

        Err(SubmissionError::AvailabilityTimeout {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeDriver;

    fn landmark() -> Locator {
        selectors::form_landmark()
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_immediately_on_first_successful_lookup() {
        let driver = Arc::new(FakeDriver::new().with_element(&landmark()));
        let poller = AvailabilityPoller::new(driver.clone());

        let started = tokio::time::Instant::now();
        poller
            .wait_until_available(&landmark(), 24, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(driver.lookup_count(&landmark()), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_landmark_appears() {
        let driver = Arc::new(FakeDriver::new().with_element_after(&landmark(), 2));
        let poller = AvailabilityPoller::new(driver.clone());

        let started = tokio::time::Instant::now();
        poller
            .wait_until_available(&landmark(), 24, Duration::from_secs(5))
            .await
            .unwrap();

        // Two failed lookups, two sleeps, success on the third lookup.
        assert_eq!(driver.lookup_count(&landmark()), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhaustion_does_n_lookups_and_n_minus_one_sleeps() {
        let driver = Arc::new(FakeDriver::new());
        let poller = AvailabilityPoller::new(driver.clone());

        let started = tokio::time::Instant::now();
        let err = poller
            .wait_until_available(&landmark(), 4, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::AvailabilityTimeout { attempts: 4 }
        ));
        assert_eq!(driver.lookup_count(&landmark()), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_single_attempt_budget_never_sleeps() {
        let driver = Arc::new(FakeDriver::new());
        let poller = AvailabilityPoller::new(driver.clone());

        let err = poller
            .wait_until_available(&landmark(), 1, Duration::from_secs(3600))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::AvailabilityTimeout { attempts: 1 }
        ));
        assert_eq!(driver.lookup_count(&landmark()), 1);
    }

    #[tokio::test]
    async fn test_check_site_passes_without_error_indicator() {
        let driver = Arc::new(FakeDriver::new());
        let poller = AvailabilityPoller::new(driver.clone());

        poller.check_site("https://library.test/news").await.unwrap();
        assert_eq!(driver.lookup_count(&selectors::error_indicator()), 1);
    }

    #[tokio::test]
    async fn test_error_indicator_is_fatal_and_skips_polling() {
        let driver = Arc::new(FakeDriver::new().with_element(&selectors::error_indicator()));
        let poller = AvailabilityPoller::new(driver.clone());

        let err = poller
            .check_site("https://library.test/news")
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::SiteUnreachable(url) if url.contains("news")));
        // The landmark is never probed once the site is known to be down.
        assert_eq!(driver.lookup_count(&landmark()), 0);
    }
}
