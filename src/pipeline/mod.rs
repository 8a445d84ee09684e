use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Error, Result, anyhow};
use async_channel::{Receiver, Sender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, trace};

use crate::Config;
use crate::config::ClientConfig;
use crate::pipeline::counter::ObjectCounter;
use crate::pipeline::existence_checker::ExistenceChecker;
use crate::pipeline::lister::ObjectLister;
use crate::pipeline::stage::Stage;
use crate::pipeline::transferer::ObjectTransferer;
use crate::pipeline::worker_pool::WorkerPool;
use crate::storage::s3::S3StorageFactory;
use crate::storage::{Storage, StorageFactory, StoragePair};
use crate::types::error::MigrateError;
use crate::types::progress::ProgressCounter;
use crate::types::report::{ReportEvent, SharedReportSink};
use crate::types::{MigrationStatistics, MigrationSummary, ObjectIdentifier};

const CHANNEL_CAPACITY: usize = 20000;

mod counter;
mod existence_checker;
mod lister;
mod stage;
mod transferer;
pub mod worker_pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Counting,
    Dispatching,
    Draining,
    Done,
}

/// Lists the configured prefix and copies every object that is missing in the destination.
pub struct Pipeline {
    config: Config,
    source: Storage,
    destination: Storage,
    report_sink: SharedReportSink,
    stats_sender: Sender<MigrationStatistics>,
    stats_receiver: Receiver<MigrationStatistics>,
    stats_subscribed: AtomicBool,
    has_error: Arc<AtomicBool>,
    has_warning: Arc<AtomicBool>,
    state: PipelineState,
}

impl Pipeline {
    /// Build S3 clients for both endpoints of `config`.
    pub async fn new(config: Config, report_sink: SharedReportSink) -> Result<Self> {
        let source_client_config = config.source_client_config.clone().ok_or_else(|| {
            MigrateError::InvalidConfig("source endpoint is not configured.".to_string())
        })?;
        let destination_client_config =
            config.destination_client_config.clone().ok_or_else(|| {
                MigrateError::InvalidConfig("destination endpoint is not configured.".to_string())
            })?;

        let source = S3StorageFactory::create(source_client_config, config.transfer_config).await;
        let destination =
            S3StorageFactory::create(destination_client_config, config.transfer_config).await;

        Ok(Self::with_storages(
            config,
            StoragePair {
                source,
                destination,
            },
            report_sink,
        ))
    }

    pub fn with_storages(
        config: Config,
        storages: StoragePair,
        report_sink: SharedReportSink,
    ) -> Self {
        let (stats_sender, stats_receiver) = async_channel::unbounded();

        Self {
            config,
            source: storages.source,
            destination: storages.destination,
            report_sink,
            stats_sender,
            stats_receiver,
            stats_subscribed: AtomicBool::new(false),
            has_error: Arc::new(AtomicBool::new(false)),
            has_warning: Arc::new(AtomicBool::new(false)),
            state: PipelineState::Idle,
        }
    }

    /// Run the migration once.
    ///
    /// Per-object failures are part of the returned summary. A listing failure
    /// is returned as `Err` after every dispatched transfer has finished.
    pub async fn run(&mut self) -> Result<MigrationSummary> {
        if self.state != PipelineState::Idle {
            return Err(anyhow!(MigrateError::AlreadyExecuted));
        }

        // Nobody will drain the unbounded channel.
        if !self.stats_subscribed.load(Ordering::SeqCst) {
            self.close_stats_sender();
        }

        self.report(ReportEvent::RunStart {
            source: endpoint_name(&self.config.source_client_config),
            destination: endpoint_name(&self.config.destination_client_config),
            bucket: self.config.bucket.clone(),
            prefix: self.config.prefix.clone(),
        })
        .await;

        let total = if self.config.count_objects {
            self.state = PipelineState::Counting;
            match self.count_objects().await {
                Ok(total) => Some(total),
                Err(e) => {
                    self.state = PipelineState::Done;
                    return Err(self.log_error(e, "count objects failed."));
                }
            }
        } else {
            None
        };

        self.state = PipelineState::Dispatching;
        let summary = Arc::new(Mutex::new(MigrationSummary {
            total,
            ..Default::default()
        }));
        let transferer = Arc::new(ObjectTransferer::new(
            self.create_stage(None),
            ExistenceChecker::new(dyn_clone::clone_box(&*self.destination)),
            Arc::new(ProgressCounter::new(total)),
            summary.clone(),
        ));
        let worker_pool = WorkerPool::new(self.config.concurrency);

        let (objects, lister) = self.list_source();
        let dispatch_result = dispatch(&objects, &worker_pool, transferer).await;
        objects.close();
        let listing_result = lister.await.context("tokio::task::JoinHandle failed.");

        self.state = PipelineState::Draining;
        worker_pool.drain().await;
        self.state = PipelineState::Done;

        if let Err(e) = dispatch_result {
            return Err(self.log_error(e, "dispatch objects failed."));
        }
        if let Err(e) =
            listing_result.and_then(|result| result.context(MigrateError::ListingFailed))
        {
            return Err(self.log_error(e, "list source objects failed."));
        }

        let summary = *summary.lock().await;
        self.report(ReportEvent::RunComplete { summary }).await;

        Ok(summary)
    }

    async fn count_objects(&self) -> Result<u64> {
        let (objects, lister) = self.list_source();
        ObjectCounter::new(self.create_stage(None))
            .count(objects, lister)
            .await
    }

    fn list_source(&self) -> (Receiver<ObjectIdentifier>, JoinHandle<Result<()>>) {
        let (sender, receiver) = async_channel::bounded::<ObjectIdentifier>(CHANNEL_CAPACITY);
        let lister = ObjectLister::new(self.create_stage(Some(sender)));
        let max_keys = self.config.max_keys;

        let handle = tokio::spawn(async move { lister.list_source(max_keys).await });

        (receiver, handle)
    }

    fn create_stage(&self, sender: Option<Sender<ObjectIdentifier>>) -> Stage {
        Stage::new(
            self.config.clone(),
            Some(dyn_clone::clone_box(&*self.source)),
            Some(dyn_clone::clone_box(&*self.destination)),
            sender,
            self.stats_sender.clone(),
            self.report_sink.clone(),
            self.has_warning.clone(),
        )
    }

    async fn report(&self, event: ReportEvent) {
        self.report_sink.on_report(event).await;
    }

    fn log_error(&self, e: Error, message: &str) -> Error {
        self.has_error.store(true, Ordering::SeqCst);

        error!(error = format!("{e:#}"), message);
        e
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Receiver of per-object statistics.
    ///
    /// The channel is unbounded, so it must be drained while `run` is in
    /// progress. Statistics are only sent when this is called before `run`.
    pub fn get_stats_receiver(&self) -> Receiver<MigrationStatistics> {
        self.stats_subscribed.store(true, Ordering::SeqCst);
        self.stats_receiver.clone()
    }

    pub fn close_stats_sender(&self) {
        self.stats_sender.close();
    }

    pub fn has_error(&self) -> bool {
        self.has_error.load(Ordering::SeqCst)
    }

    /// True when at least one object failed to copy.
    pub fn has_warning(&self) -> bool {
        self.has_warning.load(Ordering::SeqCst)
    }
}

/// Spawn one transfer per listed object, in listing order.
async fn dispatch(
    objects: &Receiver<ObjectIdentifier>,
    worker_pool: &WorkerPool,
    transferer: Arc<ObjectTransferer>,
) -> Result<()> {
    trace!("dispatch objects has started.");

    while let Ok(object) = objects.recv().await {
        let permit = worker_pool.acquire().await?;
        let transferer = transferer.clone();
        worker_pool.spawn(permit, async move {
            transferer.migrate(object).await;
        });
    }

    trace!("dispatch objects has been completed.");
    Ok(())
}

fn endpoint_name(client_config: &Option<ClientConfig>) -> String {
    client_config
        .as_ref()
        .map(|client_config| client_config.endpoint.clone())
        .unwrap_or_default()
}
