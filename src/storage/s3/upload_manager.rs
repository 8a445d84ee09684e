use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{trace, warn};

use crate::config::TransferConfig;

/// Uploads a body whose length is not known in advance.
///
/// The body is consumed in `multipart_chunksize` pieces. A body that ends
/// inside the first piece becomes a single PutObject, anything longer becomes
/// a multipart upload that is aborted on failure.
pub struct UploadManager {
    client: Arc<Client>,
    transfer_config: TransferConfig,
}

impl UploadManager {
    pub fn new(client: Arc<Client>, transfer_config: TransferConfig) -> Self {
        UploadManager {
            client,
            transfer_config,
        }
    }

    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        get_object_output: GetObjectOutput,
    ) -> Result<u64> {
        let content_type = get_object_output
            .content_type()
            .map(|value| value.to_string());
        let mut body = get_object_output.body.into_async_read();

        let first_chunk = read_chunk(&mut body, self.chunksize()).await?;
        if !self
            .transfer_config
            .is_multipart_upload_required(first_chunk.len() as u64)
        {
            return self
                .singlepart_upload(bucket, key, content_type, first_chunk)
                .await;
        }

        self.multipart_upload(bucket, key, content_type, first_chunk, body)
            .await
    }

    async fn singlepart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
        buffer: Vec<u8>,
    ) -> Result<u64> {
        let size = buffer.len() as u64;

        // An SdkBody is retryable when constructed from in-memory data.
        let put_object_output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(size as i64)
            .set_content_type(content_type)
            .body(ByteStream::from(buffer))
            .send()
            .await
            .context("aws_sdk_s3::client::Client put_object() failed.")?;

        trace!(key = key, "{put_object_output:?}");

        Ok(size)
    }

    async fn multipart_upload<R>(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<String>,
        first_chunk: Vec<u8>,
        body: R,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let create_multipart_upload_output = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .set_content_type(content_type)
            .send()
            .await
            .context("aws_sdk_s3::client::Client create_multipart_upload() failed.")?;
        let upload_id = create_multipart_upload_output
            .upload_id()
            .ok_or_else(|| anyhow!("create_multipart_upload() returned no upload id."))?
            .to_string();

        let upload_result = self
            .upload_parts_and_complete(bucket, key, &upload_id, first_chunk, body)
            .await
            .context("upload_parts() failed.");

        if upload_result.is_err() {
            let abort_result = self
                .client
                .abort_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await
                .context("aws_sdk_s3::client::Client abort_multipart_upload() failed.");
            if let Err(e) = abort_result {
                warn!(
                    key = key,
                    upload_id = upload_id,
                    error = format!("{e:#}"),
                    "abort_multipart_upload() failed."
                );
            }
        }

        upload_result
    }

    async fn upload_parts_and_complete<R>(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        first_chunk: Vec<u8>,
        mut body: R,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut upload_parts: Vec<CompletedPart> = Vec::new();
        let mut uploaded_bytes = 0u64;
        let mut part_number = 1;
        let mut buffer = first_chunk;

        while !buffer.is_empty() {
            let chunksize = buffer.len();

            let upload_part_output = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .content_length(chunksize as i64)
                .body(ByteStream::from(buffer))
                .send()
                .await
                .context("aws_sdk_s3::client::Client upload_part() failed.")?;

            trace!(key = key, "{upload_part_output:?}");

            upload_parts.push(
                CompletedPart::builder()
                    .set_e_tag(upload_part_output.e_tag().map(|e_tag| e_tag.to_string()))
                    .part_number(part_number)
                    .build(),
            );

            uploaded_bytes += chunksize as u64;
            part_number += 1;

            if chunksize < self.chunksize() {
                break;
            }
            buffer = read_chunk(&mut body, self.chunksize()).await?;
        }
        trace!(key = key, upload_id = upload_id, "{upload_parts:?}");

        let complete_multipart_upload_output = self
            .client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(upload_parts))
                    .build(),
            )
            .send()
            .await
            .context("aws_sdk_s3::client::Client complete_multipart_upload() failed.")?;

        trace!(key = key, upload_id = upload_id, "{complete_multipart_upload_output:?}");

        Ok(uploaded_bytes)
    }

    fn chunksize(&self) -> usize {
        self.transfer_config.multipart_chunksize as usize
    }
}

/// Read until `chunksize` bytes are buffered or the body ends.
async fn read_chunk<R>(body: &mut R, chunksize: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::<u8>::with_capacity(chunksize);
    body.take(chunksize as u64)
        .read_to_end(&mut buffer)
        .await
        .context("async_read_ext::AsyncReadExt read_to_end() failed.")?;

    Ok(buffer)
}
