/*!
# Overview
s3migrate copies a directory (key prefix) of objects from one S3-compatible
storage to another. Objects that already exist in the destination are skipped,
so an interrupted migration can simply be run again.

## Features
- Any S3-compatible endpoint on either side (Amazon S3, MinIO, ...).
- Bounded concurrency: at most `concurrency` objects are in flight at once.
- Streaming transfer: an object body is never buffered as a whole. Objects
  larger than `multipart_chunksize` are written with a multipart upload.
- Optional progress estimation: the source is counted first, and every
  outcome is reported as `[k/total]`.

## As a library
The CLI is a thin wrapper of [`pipeline::Pipeline`]. Any storage implementing
[`storage::StorageTrait`] can be used, and every human-readable line goes
through a [`types::report::ReportSink`].

Example usage
=============

```no_run
use std::sync::Arc;

use s3migrate::config::Config;
use s3migrate::config::args::parse_from_args;
use s3migrate::pipeline::Pipeline;
use s3migrate::types::MigrationStatistics;
use s3migrate::types::report::TracingReportSink;

#[tokio::main]
async fn main() {
    // The configuration file holds both endpoints and the directory to migrate.
    let args = vec!["program_name", "--config", "./config.json", "--progress"];
    let config = Config::try_from(parse_from_args(args).unwrap()).unwrap();

    let mut pipeline = Pipeline::new(config, Arc::new(TracingReportSink))
        .await
        .unwrap();
    let stats_receiver = pipeline.get_stats_receiver();

    let summary = pipeline.run().await.unwrap();
    pipeline.close_stats_sender();

    let mut transferred_bytes = 0;
    while let Ok(stats) = stats_receiver.try_recv() {
        if let MigrationStatistics::TransferBytes(bytes) = stats {
            transferred_bytes += bytes;
        }
    }
    println!("copied: {}, bytes: {transferred_bytes}", summary.copied);

    if summary.has_failure() {
        println!("{} objects could not be copied.", summary.failed);
    }
}
```
*/

pub use config::Config;
pub use config::args::CLIArgs;

pub mod config;
pub mod pipeline;
pub mod storage;
pub mod types;
