//! Submission failure taxonomy.

use thiserror::Error;

use crate::browser::BrowserError;

/// Why a submission workflow stopped.
///
/// Every kind is terminal for the current workflow instance; nothing here
/// is auto-retried beyond the bounded availability poll.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("The website is not available: {0}")]
    SiteUnreachable(String),

    #[error("The form did not become available after {attempts} attempts")]
    AvailabilityTimeout { attempts: u32 },

    #[error("Navigation to the form failed: {0}")]
    NavigationFailure(String),

    #[error("The form window could not be reached: {0}")]
    WindowSwitchFailure(String),

    #[error("Form field cannot be found: {0}")]
    FieldNotFound(&'static str),

    #[error("The submit control cannot be found")]
    SubmitControlNotFound,

    #[error("Browser session failure: {0}")]
    Session(BrowserError),
}

/// Terminal result of one workflow run. Produced once per user record.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Succeeded,
    Failed(SubmissionError),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}
