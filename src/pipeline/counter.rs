use std::time::Duration;

use anyhow::{Context, Result};
use async_channel::Receiver;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use super::stage::Stage;
use crate::types::error::MigrateError;
use crate::types::report::ReportEvent;
use crate::types::{MigrationStatistics, ObjectIdentifier};

pub const COUNT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Pre-count pass over a listing, used to fix the progress total.
pub struct ObjectCounter {
    base: Stage,
}

impl ObjectCounter {
    pub fn new(base: Stage) -> Self {
        Self { base }
    }

    /// Drain `objects` and return how many were received.
    ///
    /// A "still counting" report is emitted once per interval while the
    /// listing is running. A failed listing yields `Err` and no total.
    pub async fn count(
        &self,
        objects: Receiver<ObjectIdentifier>,
        lister: JoinHandle<Result<()>>,
    ) -> Result<u64> {
        trace!("count objects has started.");

        let bucket = self.base.config.bucket.clone();
        let prefix = self.base.config.prefix.clone();
        self.base
            .report(ReportEvent::CountStart {
                bucket: bucket.clone(),
                prefix: prefix.clone(),
            })
            .await;

        let mut ticker = tokio::time::interval_at(
            Instant::now() + COUNT_PROGRESS_INTERVAL,
            COUNT_PROGRESS_INTERVAL,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut counted = 0u64;
        loop {
            tokio::select! {
                recv_result = objects.recv() => {
                    match recv_result {
                        Ok(_) => counted += 1,
                        Err(_) => break,
                    }
                },
                _ = ticker.tick() => {
                    self.base.report(ReportEvent::CountProgress { counted }).await;
                }
            }
        }

        lister
            .await
            .context("tokio::task::JoinHandle failed.")?
            .context(MigrateError::ListingFailed)?;

        self.base
            .send_stats(MigrationStatistics::ObjectsCounted(counted))
            .await;
        self.base
            .report(ReportEvent::CountComplete {
                bucket,
                prefix,
                total: counted,
            })
            .await;

        trace!(counted = counted, "count objects has been completed.");
        Ok(counted)
    }
}
