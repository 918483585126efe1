//! Form submission.

use std::sync::Arc;

use tracing::info;

use crate::browser::{BrowserDriver, BrowserError};

use super::errors::SubmissionError;
use super::selectors;

/// Clicks the submit control and records the response page.
pub struct FormSubmitter {
    driver: Arc<dyn BrowserDriver>,
}

impl FormSubmitter {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }

    /// Submit the filled form.
    ///
    /// Submission is complete once the click lands; the response page is
    /// captured for the operator, but no success banner is verified
    /// in-band. TODO: check a post-submit confirmation indicator once the
    /// site exposes a stable one.
    pub async fn submit(&self) -> Result<(), SubmissionError> {
        match self.driver.click(&selectors::submit_button()).await {
            Ok(()) => {}
            Err(BrowserError::ElementNotFound(_)) => {
                return Err(SubmissionError::SubmitControlNotFound)
            }
            Err(e) => return Err(SubmissionError::Session(e)),
        }

        let _ = self.driver.screenshot("submitted").await;
        info!("Form was submitted");
        Ok(())
    }
}
