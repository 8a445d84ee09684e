use std::io;
use std::io::Write;

use async_channel::Receiver;
use indicatif::{HumanBytes, HumanCount, HumanDuration, ProgressBar, ProgressStyle};
use s3migrate::types::{MIGRATION_SUMMARY_NAME, MigrationStatistics};
use simple_moving_average::{SMA, SumTreeSMA};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

const MOVING_AVERAGE_PERIOD_SECS: usize = 10;
const REFRESH_INTERVAL: f32 = 1.0;

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    counted: Option<u64>,
    copied: u64,
    copied_bytes: u64,
    skipped: u64,
    failed: u64,
}

impl Totals {
    fn processed(&self) -> u64 {
        self.copied + self.skipped + self.failed
    }

    fn processed_text(&self) -> String {
        match self.counted {
            Some(total) => format!("{}/{}", self.processed(), total),
            None => self.processed().to_string(),
        }
    }
}

pub fn show_indicator(
    stats_receiver: Receiver<MigrationStatistics>,
    show_progress: bool,
    show_result: bool,
    log_migration_summary: bool,
) -> JoinHandle<()> {
    let progress_text = ProgressBar::new(0);
    progress_text.set_style(text_style("{wide_msg}"));

    tokio::spawn(async move {
        let start_time = Instant::now();

        let mut ma_copied_bytes = SumTreeSMA::<_, u64, MOVING_AVERAGE_PERIOD_SECS>::new();
        let mut ma_copied_count = SumTreeSMA::<_, u64, MOVING_AVERAGE_PERIOD_SECS>::new();

        let mut totals = Totals::default();

        loop {
            let mut copied_bytes: u64 = 0;
            let mut copied_count: u64 = 0;

            let period = Instant::now();
            loop {
                while let Ok(stats) = stats_receiver.try_recv() {
                    match stats {
                        MigrationStatistics::ObjectsCounted(count) => {
                            totals.counted = Some(count);
                        }
                        MigrationStatistics::TransferBytes(size) => {
                            copied_bytes += size;
                            totals.copied_bytes += size;
                        }
                        MigrationStatistics::ObjectCopied { .. } => {
                            copied_count += 1;
                            totals.copied += 1;
                        }
                        MigrationStatistics::ObjectSkipped { .. } => {
                            totals.skipped += 1;
                        }
                        MigrationStatistics::ObjectFailed { .. } => {
                            totals.failed += 1;
                        }
                    }
                }

                if REFRESH_INTERVAL < period.elapsed().as_secs_f32() {
                    break;
                }

                if stats_receiver.is_closed() && stats_receiver.is_empty() {
                    let elapsed = start_time.elapsed();
                    let elapsed_secs_f64 = elapsed.as_secs_f64();

                    let mut objects_per_sec = (totals.copied as f64 / elapsed_secs_f64) as u64;
                    let mut copied_bytes_per_sec =
                        (totals.copied_bytes as f64 / elapsed_secs_f64) as u64;

                    if elapsed_secs_f64 < REFRESH_INTERVAL as f64 {
                        objects_per_sec = totals.copied;
                        copied_bytes_per_sec = totals.copied_bytes;
                    }

                    if log_migration_summary {
                        info!(
                            name = MIGRATION_SUMMARY_NAME,
                            processed_object = totals.processed(),
                            transferred_byte = totals.copied_bytes,
                            transferred_byte_per_sec = copied_bytes_per_sec,
                            transferred_object = totals.copied,
                            transferred_object_per_sec = objects_per_sec,
                            skipped = totals.skipped,
                            error = totals.failed,
                            duration_sec = elapsed_secs_f64,
                        );
                    }

                    if show_result {
                        progress_text.set_style(text_style("{msg}"));

                        progress_text.finish_with_message(format!(
                            "{:>3} | {:>3}/sec,  processed {} objects,  copied {:>3} objects | {:>3} objects/sec,  skipped {} objects,  error {} objects,  duration {}",
                            HumanBytes(totals.copied_bytes),
                            HumanBytes(copied_bytes_per_sec),
                            totals.processed_text(),
                            totals.copied,
                            HumanCount(objects_per_sec),
                            totals.skipped,
                            totals.failed,
                            HumanDuration(elapsed),
                        ));

                        println!();
                        let _ = io::stdout().flush();
                    }

                    return;
                }

                tokio::time::sleep(std::time::Duration::from_secs_f32(0.05)).await;
            }
            ma_copied_bytes.add_sample(copied_bytes);
            ma_copied_count.add_sample(copied_count);

            if show_progress {
                progress_text.set_message(format!(
                    "{:>3} | {:>3}/sec,  processed {} objects,  copied {:>3} objects | {:>3} objects/sec,  skipped {} objects,  error {} objects",
                    HumanBytes(totals.copied_bytes),
                    HumanBytes(ma_copied_bytes.get_average()).to_string(),
                    totals.processed_text(),
                    totals.copied,
                    HumanCount(ma_copied_count.get_average()).to_string(),
                    totals.skipped,
                    totals.failed,
                ));
            }
        }
    })
}

fn text_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}
