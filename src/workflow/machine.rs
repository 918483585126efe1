//! The submission workflow state machine.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::browser::BrowserDriver;
use crate::form::UserRecord;

use super::errors::{SubmissionError, SubmissionOutcome};
use super::filler::FormFiller;
use super::navigator::FormNavigator;
use super::poller::AvailabilityPoller;
use super::selectors;
use super::submitter::FormSubmitter;
use super::WorkflowConfig;

/// Phases a submission run moves through. Any phase can fail into the
/// terminal `Failed` outcome; the happy path walks them in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    CheckingSite,
    WaitingForForm,
    Navigating,
    Filling,
    Submitting,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckingSite => "checking-site",
            Self::WaitingForForm => "waiting-for-form",
            Self::Navigating => "navigating",
            Self::Filling => "filling",
            Self::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

/// One submission run for one user record over one remote session.
pub struct SubmissionWorkflow {
    driver: Arc<dyn BrowserDriver>,
    config: WorkflowConfig,
}

impl SubmissionWorkflow {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: WorkflowConfig) -> Self {
        Self { driver, config }
    }

    /// Run the workflow to its terminal outcome.
    ///
    /// The remote session is terminated exactly once before this returns,
    /// on the success path and on every failure path alike.
    pub async fn run(self, record: &UserRecord) -> SubmissionOutcome {
        info!("Starting submission workflow for user: {}", record.name);

        let result = self.execute(record).await;
        self.driver.close().await;

        match result {
            Ok(()) => {
                info!("Submission workflow finished for user: {}", record.name);
                SubmissionOutcome::Succeeded
            }
            Err(e) => {
                error!("Submission for user {} failed: {}", record.name, e);
                SubmissionOutcome::Failed(e)
            }
        }
    }

    async fn execute(&self, record: &UserRecord) -> Result<(), SubmissionError> {
        let poller = AvailabilityPoller::new(self.driver.clone());
        let navigator = FormNavigator::new(self.driver.clone());
        let filler = FormFiller::new(self.driver.clone());
        let submitter = FormSubmitter::new(self.driver.clone());

        let mut state = WorkflowState::CheckingSite;
        loop {
            debug!("Workflow state: {}", state);
            state = match state {
                WorkflowState::CheckingSite => {
                    poller.check_site(&self.config.news_url).await?;
                    WorkflowState::WaitingForForm
                }
                WorkflowState::WaitingForForm => {
                    poller
                        .wait_until_available(
                            &selectors::form_landmark(),
                            self.config.poll_max_attempts,
                            self.config.poll_interval,
                        )
                        .await?;
                    WorkflowState::Navigating
                }
                WorkflowState::Navigating => {
                    navigator.go_to_form(&self.config.form_page_url).await?;
                    WorkflowState::Filling
                }
                WorkflowState::Filling => {
                    filler.fill_form(record).await?;
                    WorkflowState::Submitting
                }
                WorkflowState::Submitting => {
                    submitter.submit().await?;
                    return Ok(());
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeCall, FakeDriver};
    use crate::workflow::testkit;

    #[tokio::test]
    async fn test_happy_path_succeeds_and_closes_once() {
        let record = testkit::record("anna");
        let driver = testkit::happy_driver(&record);
        let workflow = SubmissionWorkflow::new(driver.clone(), testkit::config());

        let outcome = workflow.run(&record).await;

        assert!(outcome.is_success());
        assert_eq!(driver.close_calls(), 1);

        // The session is closed only after the submit click.
        let calls = driver.calls();
        let submit_at = calls
            .iter()
            .position(|c| matches!(c, FakeCall::Click(l) if l == &selectors::submit_button().to_string()))
            .unwrap();
        let close_at = calls
            .iter()
            .position(|c| matches!(c, FakeCall::Close))
            .unwrap();
        assert!(submit_at < close_at);
    }

    #[tokio::test]
    async fn test_site_unreachable_short_circuits_and_closes_once() {
        let driver = Arc::new(FakeDriver::new().with_element(&selectors::error_indicator()));
        let workflow = SubmissionWorkflow::new(driver.clone(), testkit::config());

        let outcome = workflow.run(&testkit::record("anna")).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(SubmissionError::SiteUnreachable(_))
        ));
        assert_eq!(driver.close_calls(), 1);
        // Zero landmark lookups after the fatal reachability check.
        assert_eq!(driver.lookup_count(&selectors::form_landmark()), 0);
    }

    #[tokio::test]
    async fn test_availability_timeout_closes_once() {
        let driver = Arc::new(FakeDriver::new());
        let workflow = SubmissionWorkflow::new(driver.clone(), testkit::config());

        let outcome = workflow.run(&testkit::record("anna")).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(SubmissionError::AvailabilityTimeout { attempts: 3 })
        ));
        assert_eq!(driver.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_closes_once() {
        let record = testkit::record("anna");
        let driver = Arc::new(
            FakeDriver::new()
                .with_element(&selectors::form_landmark())
                .with_element(&selectors::form_link())
                .with_windows(vec![crate::browser::WindowHandle::new("main")])
                .on_click_windows(
                    &selectors::form_link(),
                    vec![
                        crate::browser::WindowHandle::new("main"),
                        crate::browser::WindowHandle::new("form"),
                    ],
                ),
        );
        let workflow = SubmissionWorkflow::new(driver.clone(), testkit::config());

        let outcome = workflow.run(&record).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(SubmissionError::FieldNotFound("library card number"))
        ));
        assert_eq!(driver.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_submit_control_closes_once() {
        let record = testkit::record("anna");
        let driver = testkit::driver_without_submit(&record);
        let workflow = SubmissionWorkflow::new(driver.clone(), testkit::config());

        let outcome = workflow.run(&record).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(SubmissionError::SubmitControlNotFound)
        ));
        assert_eq!(driver.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_states_are_walked_in_order_on_success() {
        let record = testkit::record("anna");
        let driver = testkit::happy_driver(&record);
        let workflow = SubmissionWorkflow::new(driver.clone(), testkit::config());

        workflow.run(&record).await;

        let calls = driver.calls();
        let order = [
            calls
                .iter()
                .position(|c| matches!(c, FakeCall::Navigate(_)))
                .unwrap(),
            calls
                .iter()
                .position(|c| matches!(c, FakeCall::Find(l) if l == &selectors::form_landmark().to_string()))
                .unwrap(),
            calls
                .iter()
                .position(|c| matches!(c, FakeCall::Switch(_)))
                .unwrap(),
            calls
                .iter()
                .position(|c| matches!(c, FakeCall::Type(_, _)))
                .unwrap(),
            calls
                .iter()
                .position(|c| matches!(c, FakeCall::Click(l) if l == &selectors::submit_button().to_string()))
                .unwrap(),
        ];
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
