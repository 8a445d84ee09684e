use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::task::TaskTracker;
use tracing::trace;

/// Bounded set of in-flight transfer tasks.
///
/// A task holds one permit for its whole lifetime, so at most `capacity`
/// tasks run at once. The permit is released when the task ends, including
/// by panic.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
    capacity: usize,
}

impl WorkerPool {
    pub fn new(concurrency: u16) -> Self {
        let capacity = concurrency as usize;
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            tracker: TaskTracker::new(),
            capacity,
        }
    }

    /// Wait until a slot is free.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .context("tokio::sync::Semaphore::acquire_owned() failed.")
    }

    pub fn spawn<F>(&self, permit: OwnedSemaphorePermit, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(async move {
            let _permit = permit;
            task.await;
        });
    }

    /// Wait for every spawned task to finish.
    pub async fn drain(&self) {
        trace!(outstanding = self.outstanding(), "draining worker pool.");

        self.tracker.close();
        self.tracker.wait().await;

        trace!("worker pool has been drained.");
    }

    pub fn outstanding(&self) -> usize {
        self.tracker.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tracing_subscriber::EnvFilter;

    use super::*;

    #[tokio::test]
    async fn in_flight_never_exceeds_capacity() {
        init_dummy_tracing_subscriber();

        let pool = WorkerPool::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let permit = pool.acquire().await.unwrap();
            let in_flight = in_flight.clone();
            let max_in_flight = max_in_flight.clone();
            let finished = finished.clone();
            pool.spawn(permit, async move {
                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(current, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.drain().await;

        assert_eq!(finished.load(Ordering::SeqCst), 20);
        assert!(max_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.available_permits(), pool.capacity());
    }

    #[tokio::test]
    async fn permit_is_released_on_panic() {
        init_dummy_tracing_subscriber();

        let pool = WorkerPool::new(1);

        let permit = pool.acquire().await.unwrap();
        pool.spawn(permit, async {
            panic!("task panicked");
        });

        let permit = tokio::time::timeout(Duration::from_secs(5), pool.acquire())
            .await
            .unwrap()
            .unwrap();
        drop(permit);

        pool.drain().await;
        assert_eq!(pool.available_permits(), 1);
    }

    #[tokio::test]
    async fn drain_empty_pool() {
        init_dummy_tracing_subscriber();

        let pool = WorkerPool::new(4);
        pool.drain().await;

        assert_eq!(pool.outstanding(), 0);
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
