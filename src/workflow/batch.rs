//! Fail-fast batch driver.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::browser::DriverFactory;
use crate::form::UserRecord;

use super::errors::{SubmissionError, SubmissionOutcome};
use super::machine::SubmissionWorkflow;
use super::WorkflowConfig;

/// Result of one batch invocation.
#[derive(Debug)]
pub struct BatchReport {
    /// Records attempted, including a failing one.
    pub processed: usize,
    /// Present when the batch stopped early.
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The record that stopped the batch, and why.
#[derive(Debug)]
pub struct BatchFailure {
    pub record: UserRecord,
    pub error: SubmissionError,
}

/// Runs one workflow per record, strictly in order, stopping at the first
/// failure.
///
/// A site-level fault (stale locators, redesign, outage) recurs identically
/// for every subsequent record, so continuing would waste remote-browser
/// time and produce misleading partial state.
pub struct BatchRunner {
    factory: Arc<dyn DriverFactory>,
    config: WorkflowConfig,
}

impl BatchRunner {
    pub fn new(factory: Arc<dyn DriverFactory>, config: WorkflowConfig) -> Self {
        Self { factory, config }
    }

    /// Process `records` exhaustively, one fresh session per record.
    pub async fn run_batch(&self, records: &[UserRecord]) -> BatchReport {
        let mut processed = 0;

        for record in records {
            processed += 1;
            info!(
                "Filling out form with user data: {} ({}/{})",
                record.name,
                processed,
                records.len()
            );

            let driver = match self.factory.create().await {
                Ok(driver) => driver,
                Err(e) => {
                    error!(
                        "Could not open a browser session for user {}: {}",
                        record.name, e
                    );
                    return BatchReport {
                        processed,
                        failure: Some(BatchFailure {
                            record: record.clone(),
                            error: SubmissionError::Session(e),
                        }),
                    };
                }
            };

            let workflow = SubmissionWorkflow::new(driver, self.config.clone());
            match workflow.run(record).await {
                SubmissionOutcome::Succeeded => {}
                SubmissionOutcome::Failed(error) => {
                    warn!("Stopping batch after failure for user {}", record.name);
                    return BatchReport {
                        processed,
                        failure: Some(BatchFailure {
                            record: record.clone(),
                            error,
                        }),
                    };
                }
            }
        }

        info!("Batch complete: {} record(s) submitted", processed);
        BatchReport {
            processed,
            failure: None,
        }
    }
}
