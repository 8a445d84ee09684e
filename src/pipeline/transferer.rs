use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use super::existence_checker::ExistenceChecker;
use super::stage::Stage;
use crate::types::progress::ProgressCounter;
use crate::types::report::ReportEvent;
use crate::types::{MigrationStatistics, MigrationSummary, ObjectIdentifier, TransferOutcome};

/// Copies one object from the source to the same bucket and key in the destination.
///
/// Shared by every in-flight task of a run.
pub struct ObjectTransferer {
    base: Stage,
    existence_checker: ExistenceChecker,
    progress: Arc<ProgressCounter>,
    summary: Arc<Mutex<MigrationSummary>>,
}

impl ObjectTransferer {
    pub fn new(
        base: Stage,
        existence_checker: ExistenceChecker,
        progress: Arc<ProgressCounter>,
        summary: Arc<Mutex<MigrationSummary>>,
    ) -> Self {
        Self {
            base,
            existence_checker,
            progress,
            summary,
        }
    }

    /// Transfer one object and publish its outcome.
    ///
    /// The progress counter is advanced exactly once per call, whatever the outcome.
    pub async fn migrate(&self, object: ObjectIdentifier) {
        let outcome = self.transfer(&object).await;
        let progress = self.progress.increment();

        self.summary.lock().await.record(&outcome);

        let key = object.key().to_string();
        match &outcome {
            TransferOutcome::Skipped => {
                self.base
                    .send_stats(MigrationStatistics::ObjectSkipped { key })
                    .await;
            }
            TransferOutcome::Copied(size) => {
                self.base
                    .send_stats(MigrationStatistics::TransferBytes(*size))
                    .await;
                self.base
                    .send_stats(MigrationStatistics::ObjectCopied { key })
                    .await;
            }
            TransferOutcome::Failed(_) => {
                self.base.set_warning();
                self.base
                    .send_stats(MigrationStatistics::ObjectFailed { key })
                    .await;
            }
        }

        self.base
            .report(ReportEvent::ObjectOutcome {
                object,
                outcome,
                progress,
            })
            .await;
    }

    /// Objects already present in the destination are skipped without reading the source.
    pub async fn transfer(&self, object: &ObjectIdentifier) -> TransferOutcome {
        if self.existence_checker.exists(object).await {
            debug!(key = object.key(), "object skipped.");
            return TransferOutcome::Skipped;
        }

        match self.copy(object).await {
            Ok(size) => TransferOutcome::Copied(size),
            Err(e) => TransferOutcome::Failed(e),
        }
    }

    async fn copy(&self, object: &ObjectIdentifier) -> Result<u64> {
        let source = self
            .base
            .source
            .as_ref()
            .ok_or_else(|| anyhow!("source storage is not set."))?;
        let destination = self
            .base
            .destination
            .as_ref()
            .ok_or_else(|| anyhow!("destination storage is not set."))?;

        let get_object_output = source
            .get_object(object.bucket(), object.key())
            .await
            .with_context(|| format!("failed to read '{object}' from source"))?;

        let size = destination
            .put_object(object.bucket(), object.key(), get_object_output)
            .await
            .with_context(|| format!("failed to write '{object}' to destination"))?;

        trace!(key = object.key(), size = size, "object copied.");
        Ok(size)
    }
}
