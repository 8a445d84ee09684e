use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_channel::Sender;
use async_trait::async_trait;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use tokio::sync::Mutex;

use crate::storage::{Storage, StorageTrait};
use crate::types::{ObjectIdentifier, ObjectStat};

/// In-process object storage.
///
/// Clones share the same objects and counters. Failures can be injected per
/// key, and the number of concurrent `put_object` calls is recorded.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    failures: Mutex<Failures>,
    get_counts: Mutex<HashMap<String, usize>>,
    put_counts: Mutex<HashMap<String, usize>>,
    put_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Default)]
struct Failures {
    list_after: Option<usize>,
    stat: HashSet<String>,
    get: HashSet<String>,
    put: HashSet<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Storage {
        Box::new(self.clone())
    }

    pub async fn insert(&self, bucket: &str, key: &str, data: &[u8]) {
        self.inner
            .objects
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
    }

    pub async fn contents(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.inner
            .objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.objects.lock().await.is_empty()
    }

    /// Listing fails after `count` keys have been sent.
    pub async fn fail_list_after(&self, count: usize) {
        self.inner.failures.lock().await.list_after = Some(count);
    }

    pub async fn fail_stat(&self, key: &str) {
        self.inner.failures.lock().await.stat.insert(key.to_string());
    }

    pub async fn fail_get(&self, key: &str) {
        self.inner.failures.lock().await.get.insert(key.to_string());
    }

    pub async fn fail_put(&self, key: &str) {
        self.inner.failures.lock().await.put.insert(key.to_string());
    }

    /// Every `put_object` sleeps this long before storing.
    pub async fn set_put_delay(&self, delay: Duration) {
        *self.inner.put_delay.lock().await = Some(delay);
    }

    pub async fn get_count(&self, key: &str) -> usize {
        self.inner
            .get_counts
            .lock()
            .await
            .get(key)
            .copied()
            .unwrap_or_default()
    }

    pub async fn total_get_count(&self) -> usize {
        self.inner.get_counts.lock().await.values().sum()
    }

    pub async fn put_count(&self, key: &str) -> usize {
        self.inner
            .put_counts
            .lock()
            .await
            .get(key)
            .copied()
            .unwrap_or_default()
    }

    pub async fn total_put_count(&self) -> usize {
        self.inner.put_counts.lock().await.values().sum()
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        get_object_output: GetObjectOutput,
    ) -> Result<u64> {
        let delay = *self.inner.put_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.inner.failures.lock().await.put.contains(key) {
            return Err(anyhow!("put_object() failed. key={key}."));
        }

        let data = get_object_output
            .body
            .collect()
            .await
            .context("aws_sdk_s3::primitives::ByteStream::collect() failed.")?
            .into_bytes()
            .to_vec();
        let size = data.len() as u64;

        self.inner
            .objects
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()), data);

        Ok(size)
    }
}

#[async_trait]
impl StorageTrait for MemoryStorage {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        sender: &Sender<ObjectIdentifier>,
        _max_keys: i32,
    ) -> Result<()> {
        let keys: Vec<String> = self
            .inner
            .objects
            .lock()
            .await
            .keys()
            .filter(|(object_bucket, key)| object_bucket == bucket && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect();
        let list_after = self.inner.failures.lock().await.list_after;

        for (index, key) in keys.iter().enumerate() {
            if list_after.is_some_and(|count| count <= index) {
                return Err(anyhow!("list_objects() failed. bucket={bucket}."));
            }

            if let Err(e) = sender
                .send(ObjectIdentifier::new(bucket, key))
                .await
                .context("async_channel::Sender::send() failed.")
            {
                return if !sender.is_closed() { Err(e) } else { Ok(()) };
            }
        }

        if list_after.is_some_and(|count| count <= keys.len()) {
            return Err(anyhow!("list_objects() failed. bucket={bucket}."));
        }

        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        if self.inner.failures.lock().await.stat.contains(key) {
            return Err(anyhow!("stat_object() failed. key={key}."));
        }

        Ok(self
            .inner
            .objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .map_or(ObjectStat::NotFound, |data| ObjectStat::Exists {
                size: data.len() as u64,
            }))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput> {
        *self
            .inner
            .get_counts
            .lock()
            .await
            .entry(key.to_string())
            .or_default() += 1;

        if self.inner.failures.lock().await.get.contains(key) {
            return Err(anyhow!("get_object() failed. key={key}."));
        }

        let data = self
            .contents(bucket, key)
            .await
            .ok_or_else(|| anyhow!("no such key. key={key}."))?;

        Ok(GetObjectOutput::builder()
            .content_length(data.len() as i64)
            .body(ByteStream::from(data))
            .build())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        get_object_output: GetObjectOutput,
    ) -> Result<u64> {
        *self
            .inner
            .put_counts
            .lock()
            .await
            .entry(key.to_string())
            .or_default() += 1;

        let in_flight = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let result = self.store(bucket, key, get_object_output).await;

        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        result
    }
}
