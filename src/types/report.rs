use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::types::progress::ProgressSnapshot;
use crate::types::{MigrationSummary, ObjectIdentifier, TransferOutcome};

pub type SharedReportSink = Arc<dyn ReportSink + Send + Sync>;

#[derive(Debug)]
pub enum ReportEvent {
    RunStart {
        source: String,
        destination: String,
        bucket: String,
        prefix: String,
    },
    CountStart {
        bucket: String,
        prefix: String,
    },
    CountProgress {
        counted: u64,
    },
    CountComplete {
        bucket: String,
        prefix: String,
        total: u64,
    },
    ObjectOutcome {
        object: ObjectIdentifier,
        outcome: TransferOutcome,
        progress: ProgressSnapshot,
    },
    RunComplete {
        summary: MigrationSummary,
    },
}

impl Display for ReportEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReportEvent::RunStart {
                source,
                destination,
                bucket,
                prefix,
            } => write!(
                f,
                "source: '{source}', destination: '{destination}', path: '{bucket}/{prefix}'"
            ),
            ReportEvent::CountStart { bucket, prefix } => {
                write!(f, "starting counting objects in '{bucket}/{prefix}'")
            }
            ReportEvent::CountProgress { counted } => {
                write!(f, "still counting objects: {counted} ...")
            }
            ReportEvent::CountComplete {
                bucket,
                prefix,
                total,
            } => write!(f, "total objects in '{bucket}/{prefix}': {total}"),
            ReportEvent::ObjectOutcome {
                object,
                outcome,
                progress,
            } => match outcome {
                TransferOutcome::Skipped => write!(
                    f,
                    "[{progress}] skipping '{object}', already exists in destination"
                ),
                TransferOutcome::Copied(size) => {
                    write!(f, "[{progress}] copied '{object}', {size} bytes")
                }
                TransferOutcome::Failed(e) => {
                    write!(f, "[{progress}] ERROR copying '{object}': {e:#}")
                }
            },
            ReportEvent::RunComplete { .. } => write!(f, "copy completed"),
        }
    }
}

/// Receiver of human-readable run events.
#[async_trait]
pub trait ReportSink {
    async fn on_report(&self, event: ReportEvent);
}

/// Renders every event as one tracing line.
#[derive(Debug, Default, Clone)]
pub struct TracingReportSink;

#[async_trait]
impl ReportSink for TracingReportSink {
    async fn on_report(&self, event: ReportEvent) {
        match &event {
            ReportEvent::ObjectOutcome {
                object,
                outcome: TransferOutcome::Failed(e),
                ..
            } => {
                error!(key = object.key(), error = format!("{e:#}"), "{event}");
            }
            ReportEvent::ObjectOutcome { object, .. } => {
                info!(key = object.key(), "{event}");
            }
            ReportEvent::RunComplete { summary } => {
                info!(
                    processed = summary.processed,
                    copied = summary.copied,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    copied_bytes = summary.copied_bytes,
                    "{event}"
                );
            }
            _ => info!("{event}"),
        }
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    events: Mutex<Vec<ReportEvent>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lines(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| event.to_string())
            .collect()
    }

    pub async fn take_events(&self) -> Vec<ReportEvent> {
        std::mem::take(&mut *self.events.lock().await)
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn on_report(&self, event: ReportEvent) {
        self.events.lock().await.push(event);
    }
}
