#![allow(dead_code)]

use std::sync::Arc;

use async_channel::Receiver;

use s3migrate::Config;
use s3migrate::config::TransferConfig;
use s3migrate::pipeline::Pipeline;
use s3migrate::storage::StoragePair;
use s3migrate::storage::memory::MemoryStorage;
use s3migrate::types::MigrationStatistics;
use s3migrate::types::report::MemoryReportSink;
use tracing_subscriber::EnvFilter;

pub const BUCKET: &str = "bucketname";
pub const PREFIX: &str = "dir/";

#[derive(Debug, Default)]
pub struct StatsCount {
    pub objects_counted: Option<u64>,
    pub transfer_bytes: u64,
    pub object_copied: u64,
    pub object_skipped: u64,
    pub object_failed: u64,
}

/// A source and a destination that live in memory, plus a recording report sink.
pub struct TestHelper {
    pub source: MemoryStorage,
    pub destination: MemoryStorage,
    pub report_sink: Arc<MemoryReportSink>,
}

impl TestHelper {
    pub fn new() -> Self {
        Self {
            source: MemoryStorage::new(),
            destination: MemoryStorage::new(),
            report_sink: Arc::new(MemoryReportSink::new()),
        }
    }

    pub fn create_config(concurrency: u16, count_objects: bool) -> Config {
        Config {
            source_client_config: None,
            destination_client_config: None,
            bucket: BUCKET.to_string(),
            prefix: PREFIX.to_string(),
            concurrency,
            count_objects,
            max_keys: 1000,
            transfer_config: TransferConfig {
                multipart_chunksize: 8 * 1024 * 1024,
            },
            tracing_config: None,
            auto_complete_shell: None,
            print_sample: false,
        }
    }

    pub fn create_pipeline(&self, concurrency: u16, count_objects: bool) -> Pipeline {
        Pipeline::with_storages(
            Self::create_config(concurrency, count_objects),
            StoragePair {
                source: self.source.boxed(),
                destination: self.destination.boxed(),
            },
            self.report_sink.clone(),
        )
    }

    pub async fn put_source_objects(&self, keys: &[&str]) {
        for key in keys {
            self.source
                .insert(BUCKET, key, format!("content of {key}").as_bytes())
                .await;
        }
    }

    pub async fn report_lines(&self) -> Vec<String> {
        self.report_sink.lines().await
    }

    /// Lines of per-object outcomes, in arrival order.
    pub async fn outcome_lines(&self) -> Vec<String> {
        self.report_lines()
            .await
            .into_iter()
            .filter(|line| line.starts_with('['))
            .collect()
    }

    pub fn get_stats_count(stats_receiver: Receiver<MigrationStatistics>) -> StatsCount {
        let mut stats = StatsCount::default();
        while let Ok(migration_stats) = stats_receiver.try_recv() {
            match migration_stats {
                MigrationStatistics::ObjectsCounted(count) => stats.objects_counted = Some(count),
                MigrationStatistics::TransferBytes(size) => stats.transfer_bytes += size,
                MigrationStatistics::ObjectCopied { .. } => stats.object_copied += 1,
                MigrationStatistics::ObjectSkipped { .. } => stats.object_skipped += 1,
                MigrationStatistics::ObjectFailed { .. } => stats.object_failed += 1,
            }
        }

        stats
    }

    pub fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .or_else(|_| EnvFilter::try_new("dummy=trace"))
                    .unwrap(),
            )
            .try_init();
    }
}
