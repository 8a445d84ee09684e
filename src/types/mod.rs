use std::fmt;
use std::fmt::{Debug, Display, Formatter};

use anyhow::Error;
use zeroize_derive::{Zeroize, ZeroizeOnDrop};

pub mod error;
pub mod progress;
pub mod report;

pub const MIGRATION_SUMMARY_NAME: &str = "MIGRATION_SUMMARY";

/// An object addressed by its bucket and full key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    bucket: String,
    key: String,
}

impl ObjectIdentifier {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Terminal result of one transfer attempt. Every listed object yields exactly one.
#[derive(Debug)]
pub enum TransferOutcome {
    Skipped,
    Copied(u64),
    Failed(Error),
}

/// Result of a destination stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStat {
    Exists { size: u64 },
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStatistics {
    ObjectsCounted(u64),
    TransferBytes(u64),
    ObjectCopied { key: String },
    ObjectSkipped { key: String },
    ObjectFailed { key: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub total: Option<u64>,
    pub processed: u64,
    pub copied: u64,
    pub skipped: u64,
    pub failed: u64,
    pub copied_bytes: u64,
}

impl MigrationSummary {
    pub fn record(&mut self, outcome: &TransferOutcome) {
        self.processed += 1;
        match outcome {
            TransferOutcome::Skipped => self.skipped += 1,
            TransferOutcome::Copied(size) => {
                self.copied += 1;
                self.copied_bytes += size;
            }
            TransferOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn has_failure(&self) -> bool {
        0 < self.failed
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use tracing_subscriber::EnvFilter;

    use super::*;

    #[test]
    fn object_identifier_display() {
        init_dummy_tracing_subscriber();

        let object = ObjectIdentifier::new("bucket1", "dir/a.txt");
        assert_eq!(object.bucket(), "bucket1");
        assert_eq!(object.key(), "dir/a.txt");
        assert_eq!(object.to_string(), "bucket1/dir/a.txt");
    }

    #[test]
    fn summary_records_every_outcome_kind() {
        init_dummy_tracing_subscriber();

        let mut summary = MigrationSummary::default();
        summary.record(&TransferOutcome::Copied(10));
        summary.record(&TransferOutcome::Copied(5));
        summary.record(&TransferOutcome::Skipped);
        summary.record(&TransferOutcome::Failed(anyhow!("write error")));

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.copied, 2);
        assert_eq!(summary.copied_bytes, 15);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failure());
        assert!(summary.total.is_none());
    }

    #[test]
    fn summary_without_failure() {
        init_dummy_tracing_subscriber();

        let mut summary = MigrationSummary::default();
        summary.record(&TransferOutcome::Skipped);

        assert!(!summary.has_failure());
    }

    #[test]
    fn debug_print_access_keys() {
        init_dummy_tracing_subscriber();

        let access_keys = AccessKeys {
            access_key: "access_key".to_string(),
            secret_key: "secret_key".to_string(),
            session_token: Some("session_token".to_string()),
        };
        let debug_string = format!("{access_keys:?}");

        assert!(debug_string.contains("secret_key: \"** redacted **\""));
        assert!(debug_string.contains("session_token: \"** redacted **\""));
        assert!(!debug_string.contains("\"secret_key\""));
    }

    #[test]
    fn debug_print_access_keys_without_session_token() {
        init_dummy_tracing_subscriber();

        let access_keys = AccessKeys {
            access_key: "access_key".to_string(),
            secret_key: "secret_key".to_string(),
            session_token: None,
        };
        let debug_string = format!("{access_keys:?}");

        assert!(debug_string.contains("session_token: \"None\""));
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .or_else(|_| EnvFilter::try_new("dummy=trace"))
                    .unwrap(),
            )
            .try_init();
    }
}
