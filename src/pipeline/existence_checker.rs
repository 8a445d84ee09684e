use tracing::{debug, warn};

use crate::storage::Storage;
use crate::types::{ObjectIdentifier, ObjectStat};

/// Destination probe deciding whether an object can be skipped.
pub struct ExistenceChecker {
    destination: Storage,
}

impl ExistenceChecker {
    pub fn new(destination: Storage) -> Self {
        Self { destination }
    }

    /// Only a successful stat counts as present. Any stat error means "not
    /// present" so the object is copied again.
    pub async fn exists(&self, object: &ObjectIdentifier) -> bool {
        match self
            .destination
            .stat_object(object.bucket(), object.key())
            .await
        {
            Ok(ObjectStat::Exists { size }) => {
                debug!(key = object.key(), size = size, "object exists in destination.");
                true
            }
            Ok(ObjectStat::NotFound) => false,
            Err(e) => {
                warn!(
                    key = object.key(),
                    error = format!("{e:#}"),
                    "stat_object() failed. the object will be copied."
                );
                false
            }
        }
    }
}
