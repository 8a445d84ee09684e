use anyhow::Result;
use async_channel::Sender;
use async_trait::async_trait;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use dyn_clone::DynClone;

use crate::config::{ClientConfig, TransferConfig};
use crate::types::{ObjectIdentifier, ObjectStat};

pub mod memory;
pub mod s3;

pub type Storage = Box<dyn StorageTrait + Send + Sync>;

pub struct StoragePair {
    pub source: Storage,
    pub destination: Storage,
}

#[async_trait]
pub trait StorageFactory {
    async fn create(client_config: ClientConfig, transfer_config: TransferConfig) -> Storage;
}

/// Capabilities the migration needs from an object storage.
///
/// Implementations must be safe for concurrent use from many workers;
/// clones share the underlying client.
#[async_trait]
pub trait StorageTrait: DynClone {
    /// Send every key under `prefix` (recursive) to `sender`, page by page.
    ///
    /// A listing error is returned as `Err`. Keys already sent stay sent.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        sender: &Sender<ObjectIdentifier>,
        max_keys: i32,
    ) -> Result<()>;

    /// `Ok(ObjectStat::NotFound)` only when the storage positively reports absence.
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput>;

    /// Write the body of `get_object_output` without relying on its length.
    /// Returns the number of bytes written.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        get_object_output: GetObjectOutput,
    ) -> Result<u64>;
}
