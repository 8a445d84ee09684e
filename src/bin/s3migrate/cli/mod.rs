use std::sync::Arc;

use anyhow::Result;
use tokio::time::Instant;
use tracing::{error, trace, warn};

use s3migrate::Config;
use s3migrate::pipeline::Pipeline;
use s3migrate::types::report::TracingReportSink;

mod indicator;
mod ui_config;

#[allow(dead_code)]
const EXIT_CODE_SUCCESS: i32 = 0;
#[allow(dead_code)]
const EXIT_CODE_ERROR: i32 = 1;
#[allow(dead_code)]
const EXIT_CODE_INVALID_ARGS: i32 = 2;
const EXIT_CODE_WARNING: i32 = 3;

pub async fn run(config: Config) -> Result<()> {
    let has_warning = migrate(config).await?;

    if has_warning {
        std::process::exit(EXIT_CODE_WARNING);
    }

    Ok(())
}

/// Returns true when the run completed but some objects failed.
async fn migrate(config: Config) -> Result<bool> {
    let start_time = Instant::now();
    trace!("migration pipeline start.");

    let mut pipeline = Pipeline::new(config.clone(), Arc::new(TracingReportSink)).await?;
    let indicator_join_handle = indicator::show_indicator(
        pipeline.get_stats_receiver(),
        ui_config::is_progress_indicator_needed(&config),
        ui_config::is_show_result_needed(&config),
        true,
    );

    let result = pipeline.run().await;
    pipeline.close_stats_sender();
    indicator_join_handle.await?;

    let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!(duration_sec = duration_sec, "s3migrate failed.");
            return Err(e);
        }
    };

    if summary.has_failure() {
        warn!(
            duration_sec = duration_sec,
            failed = summary.failed,
            "s3migrate has been completed with failures."
        );
        return Ok(true);
    }

    trace!(duration_sec = duration_sec, "s3migrate has been completed.");
    Ok(pipeline.has_warning())
}
