//! Core submission logic behind the invocation trigger.
//!
//! The web layer stays transport-only; this module owns the single-flight
//! guard and the coarse success/failure contract of one invocation.

use std::sync::atomic::Ordering;

use tracing::{error, info};

use crate::workflow::BatchRunner;
use crate::AppState;

/// Outcome summary returned to the invocation trigger.
///
/// Which record failed and why goes to the operational logs, not into the
/// response.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub succeeded: bool,
    /// Records attempted, including a failing one.
    pub processed: usize,
    /// Records supplied to the batch.
    pub total: usize,
    pub message: String,
}

/// Run the configured batch once. Errs when a batch is already in flight.
pub async fn run_batch_logic(state: &AppState) -> Result<SubmissionSummary, String> {
    if state.is_running.swap(true, Ordering::SeqCst) {
        return Err("A submission batch is already running".into());
    }

    let summary = run_batch_inner(state).await;
    state.is_running.store(false, Ordering::SeqCst);
    Ok(summary)
}

async fn run_batch_inner(state: &AppState) -> SubmissionSummary {
    let config = state.config.read().await.clone();
    let records = state.records.records();

    info!("Start the submission application: {} record(s)", records.len());

    let runner = BatchRunner::new(state.driver_factory.clone(), config.workflow_config());
    let report = runner.run_batch(&records).await;

    match report.failure {
        None => SubmissionSummary {
            succeeded: true,
            processed: report.processed,
            total: records.len(),
            message: "Form submitted successfully.".to_string(),
        },
        Some(failure) => {
            error!(
                "Batch stopped at user {}: {}",
                failure.record.name, failure.error
            );
            SubmissionSummary {
                succeeded: false,
                processed: report.processed,
                total: records.len(),
                message: "The application did not submit the form. \
                          The form is unavailable or an internal error occurred."
                    .to_string(),
            }
        }
    }
}
