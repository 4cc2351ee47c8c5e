use crate::config::{BatchErrorMode, Config};
use crate::datasource::{BatchSource, SourceError};
use crate::engine::StaleUserPolicy;
use crate::orchestration::batch::{run_batch_with_policy, BatchError, BatchReport};
use crate::warehouse::WarehouseState;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn BatchSource>,
    stale_user_policy: StaleUserPolicy,
    on_batch_error: BatchErrorMode,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn BatchSource>,
        stale_user_policy: StaleUserPolicy,
        on_batch_error: BatchErrorMode,
    ) -> Self {
        Self {
            source,
            stale_user_policy,
            on_batch_error,
        }
    }

    pub fn from_config(source: Arc<dyn BatchSource>, config: &Config) -> Self {
        Self::new(source, config.stale_user_policy, config.on_batch_error)
    }

    /// Apply every batch the source lists, in order.
    ///
    /// A batch that fails normalization leaves no trace in `state`, so with
    /// [`BatchErrorMode::Continue`] later batches see the same warehouse they
    /// would have seen had the failing batch never been delivered.
    pub async fn run_all(
        &self,
        state: &mut WarehouseState,
    ) -> Result<RunSummary, OrchestrationError> {
        self.run_all_with(state, |_| {}).await
    }

    /// Like [`Orchestrator::run_all`], but hands each report to `on_report`
    /// as soon as its batch is applied. Reports of batches applied before an
    /// abort are therefore delivered even when the run returns an error.
    pub async fn run_all_with<F>(
        &self,
        state: &mut WarehouseState,
        mut on_report: F,
    ) -> Result<RunSummary, OrchestrationError>
    where
        F: FnMut(&BatchReport),
    {
        let labels = self.source.list_batches().await?;
        tracing::info!("Running {} batch(es)", labels.len());

        let mut summary = RunSummary::default();
        for label in labels {
            let batch = self.source.fetch_batch(&label).await?;
            match run_batch_with_policy(
                state,
                &batch.label,
                &batch.orders,
                &batch.users,
                self.stale_user_policy,
            ) {
                Ok(report) => {
                    on_report(&report);
                    summary.reports.push(report);
                }
                Err(error) => match self.on_batch_error {
                    BatchErrorMode::Abort => {
                        return Err(OrchestrationError::Batch {
                            label,
                            source: error,
                        })
                    }
                    BatchErrorMode::Continue => {
                        tracing::warn!(batch = %label, %error, "skipping malformed batch");
                        summary.failed.push(FailedBatch { label, error });
                    }
                },
            }
        }

        tracing::info!(
            applied = summary.reports.len(),
            failed = summary.failed.len(),
            "run finished"
        );
        Ok(summary)
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<BatchReport>,
    pub failed: Vec<FailedBatch>,
}

#[derive(Debug)]
pub struct FailedBatch {
    pub label: String,
    pub error: BatchError,
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("batch {label} failed: {source}")]
    Batch {
        label: String,
        #[source]
        source: BatchError,
    },
}
