use std::sync::Arc;

use anyhow::{Context, Result};
use async_channel::Sender;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::http::Response;
use aws_smithy_types::body::SdkBody;
use tracing::{debug, info, trace};

use crate::config::{ClientConfig, TransferConfig};
use crate::storage::s3::upload_manager::UploadManager;
use crate::storage::{Storage, StorageFactory, StorageTrait};
use crate::types::{ObjectIdentifier, ObjectStat};

mod client_builder;
mod upload_manager;

pub struct S3StorageFactory {}

#[async_trait]
impl StorageFactory for S3StorageFactory {
    async fn create(client_config: ClientConfig, transfer_config: TransferConfig) -> Storage {
        S3Storage::boxed_new(Arc::new(client_config.create_client().await), transfer_config)
    }
}

#[derive(Clone)]
struct S3Storage {
    client: Arc<Client>,
    transfer_config: TransferConfig,
}

impl S3Storage {
    fn boxed_new(client: Arc<Client>, transfer_config: TransferConfig) -> Storage {
        Box::new(S3Storage {
            client,
            transfer_config,
        })
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        sender: &Sender<ObjectIdentifier>,
        max_keys: i32,
    ) -> Result<()> {
        let mut continuation_token = None;
        loop {
            let list_objects_output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .max_keys(max_keys)
                .send()
                .await
                .context("aws_sdk_s3::client::list_objects_v2() failed.")?;

            for object in list_objects_output.contents() {
                let Some(key) = object.key() else {
                    continue;
                };

                if let Err(e) = sender
                    .send(ObjectIdentifier::new(bucket, key))
                    .await
                    .context("async_channel::Sender::send() failed.")
                {
                    return if !sender.is_closed() { Err(e) } else { Ok(()) };
                }
            }

            if !list_objects_output.is_truncated().unwrap_or_default() {
                break;
            }

            continuation_token = list_objects_output
                .next_continuation_token()
                .map(|token| token.to_string());
            if continuation_token.is_none() {
                debug!(
                    bucket = bucket,
                    prefix = prefix,
                    "truncated listing without continuation token."
                );
                break;
            }
        }

        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        let result = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context("aws_sdk_s3::client::head_object() failed.");

        match result {
            Ok(head_object_output) => {
                trace!(key = key, "{head_object_output:?}");
                Ok(ObjectStat::Exists {
                    size: head_object_output.content_length().unwrap_or_default() as u64,
                })
            }
            Err(e) if is_head_object_not_found_error(&e) => Ok(ObjectStat::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput> {
        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context("aws_sdk_s3::client::get_object() failed.")?;

        Ok(result)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        get_object_output: GetObjectOutput,
    ) -> Result<u64> {
        let upload_manager = UploadManager::new(self.client.clone(), self.transfer_config);

        let size = upload_manager
            .upload(bucket, key, get_object_output)
            .await?;

        info!(bucket = bucket, key = key, size = size, "upload completed.");

        Ok(size)
    }
}

fn is_head_object_not_found_error(result: &anyhow::Error) -> bool {
    if let Some(SdkError::ServiceError(e)) =
        result.downcast_ref::<SdkError<HeadObjectError, Response<SdkBody>>>()
    {
        if e.err().is_not_found() || e.raw().status().as_u16() == 404 {
            return true;
        }
    }

    false
}
