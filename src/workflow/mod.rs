//! The resource-request submission workflow
//!
//! Orchestrates availability polling, form navigation, filling, and
//! submission for one user record, and drives whole batches fail-fast.

mod batch;
mod errors;
mod filler;
mod machine;
mod navigator;
mod poller;
pub(crate) mod selectors;
mod submitter;

pub use batch::{BatchFailure, BatchReport, BatchRunner};
pub use errors::{SubmissionError, SubmissionOutcome};
pub use filler::FormFiller;
pub use machine::{SubmissionWorkflow, WorkflowState};
pub use navigator::FormNavigator;
pub use poller::AvailabilityPoller;
pub use submitter::FormSubmitter;

use std::time::Duration;

/// Tunables for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Status/landing page checked for reachability.
    pub news_url: String,
    /// Page carrying the link that opens the request form.
    pub form_page_url: String,
    /// Availability poll budget (number of landmark lookups).
    pub poll_max_attempts: u32,
    /// Fixed pause between availability attempts.
    pub poll_interval: Duration,
}
