use async_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Config;
use crate::storage::Storage;
use crate::types::report::{ReportEvent, SharedReportSink};
use crate::types::{MigrationStatistics, ObjectIdentifier};

pub struct Stage {
    pub config: Config,
    pub source: Option<Storage>,
    pub destination: Option<Storage>,
    pub sender: Option<Sender<ObjectIdentifier>>,
    pub stats_sender: Sender<MigrationStatistics>,
    pub report_sink: SharedReportSink,
    pub has_warning: Arc<AtomicBool>,
}

impl Stage {
    pub fn new(
        config: Config,
        source: Option<Storage>,
        destination: Option<Storage>,
        sender: Option<Sender<ObjectIdentifier>>,
        stats_sender: Sender<MigrationStatistics>,
        report_sink: SharedReportSink,
        has_warning: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            source,
            destination,
            sender,
            stats_sender,
            report_sink,
            has_warning,
        }
    }

    pub async fn send_stats(&self, stats: MigrationStatistics) {
        let _ = self.stats_sender.send(stats).await;
    }

    pub async fn report(&self, event: ReportEvent) {
        self.report_sink.on_report(event).await;
    }

    pub fn set_warning(&self) {
        self.has_warning.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::TransferConfig;
    use crate::storage::memory::MemoryStorage;
    use crate::types::report::MemoryReportSink;

    pub(crate) fn create_test_config(concurrency: u16, count_objects: bool) -> Config {
        Config {
            source_client_config: None,
            destination_client_config: None,
            bucket: "bucket1".to_string(),
            prefix: "dir/".to_string(),
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

    pub(crate) fn create_test_stage(
        source: &MemoryStorage,
        destination: &MemoryStorage,
        sender: Option<Sender<ObjectIdentifier>>,
        report_sink: Arc<MemoryReportSink>,
    ) -> (Stage, async_channel::Receiver<MigrationStatistics>) {
        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let stage = Stage::new(
            create_test_config(4, false),
            Some(source.boxed()),
            Some(destination.boxed()),
            sender,
            stats_sender,
            report_sink,
            Arc::new(AtomicBool::new(false)),
        );

        (stage, stats_receiver)
    }

    #[tokio::test]
    async fn send_stats_and_report() {
        let report_sink = Arc::new(MemoryReportSink::new());
        let (stage, stats_receiver) = create_test_stage(
            &MemoryStorage::new(),
            &MemoryStorage::new(),
            None,
            report_sink.clone(),
        );

        stage.send_stats(MigrationStatistics::ObjectsCounted(3)).await;
        stage
            .report(ReportEvent::CountProgress { counted: 3 })
            .await;
        stage.set_warning();

        assert_eq!(
            stats_receiver.recv().await.unwrap(),
            MigrationStatistics::ObjectsCounted(3)
        );
        assert_eq!(
            report_sink.lines().await,
            vec!["still counting objects: 3 ...".to_string()]
        );
        assert!(stage.has_warning.load(Ordering::SeqCst));
    }
}
