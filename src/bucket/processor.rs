// src/bucket/processor.rs

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::handoff::Batches;
use super::types::BucketError;

/// Handles one drained batch at a time.
#[async_trait]
pub trait Processor<T>: Send + Sync {
    async fn process(&self, cancel: &CancellationToken, items: &[T]) -> Result<(), BucketError>;
}

#[async_trait]
impl<T, F, Fut> Processor<T> for F
where
    F: Fn(&CancellationToken, &[T]) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<(), BucketError>> + Send,
    T: Send + Sync,
{
    async fn process(&self, ctx: &CancellationToken, items: &[T]) -> Result<(), BucketError> {
        self(ctx, items).await
    }
}

impl<T> Batches<T>
where
    T: Send + Sync,
{
    /// Feeds every batch to `process` until the group closes its output.
    ///
    /// Stops at the first processor error, or with [`BucketError::Cancelled`]
    /// when `cancel` fires first. Dropping `self` on return lets the relay
    /// discard whatever is still signaled, so producers never stall on a dead
    /// consumer.
    pub async fn drain<P>(mut self, cancel: &CancellationToken, process: P) -> Result<usize, BucketError>
    where
        P: Processor<T>,
    {
        let mut processed = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(processed, "drain cancelled");
                    return Err(BucketError::Cancelled);
                }

                batch = self.recv() => {
                    let Some(batch) = batch else {
                        debug!(processed, "batches exhausted");
                        return Ok(processed);
                    };
                    let items = batch.into_vec();
                    if items.is_empty() {
                        continue;
                    }
                    process.process(cancel, &items).await?;
                    processed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketGroup;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProcessor {
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Processor<i32> for CountingProcessor {
        async fn process(
            &self,
            _ctx: &CancellationToken,
            items: &[i32],
        ) -> Result<(), BucketError> {
            self.counter.fetch_add(items.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingProcessor;

    #[async_trait]
    impl Processor<i32> for FailingProcessor {
        async fn process(
            &self,
            _ctx: &CancellationToken,
            _items: &[i32],
        ) -> Result<(), BucketError> {
            Err(BucketError::ProcessorError("sink unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_drain_counts_batches() {
        let group = BucketGroup::new(5, 4);
        let batches = group.open().unwrap();
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let drain = {
            let cancel = cancel.clone();
            let processor = CountingProcessor {
                counter: Arc::clone(&counter),
            };
            tokio::spawn(async move { batches.drain(&cancel, processor).await })
        };

        for i in 0..12 {
            group.push(i).await.unwrap();
        }
        group.close().await.unwrap();

        assert_eq!(drain.await.unwrap().unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_drain_with_closure() {
        let group = BucketGroup::new(3, 2);
        let batches = group.open().unwrap();
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let drain = {
            let cancel = cancel.clone();
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                batches
                    .drain(&cancel, move |_ctx: &CancellationToken, items: &[i32]| {
                        let n = items.len();
                        let counter = Arc::clone(&counter);
                        async move {
                            counter.fetch_add(n, Ordering::SeqCst);
                            Ok(())
                        }
                    })
                    .await
            })
        };

        for i in 0..6 {
            group.push(i).await.unwrap();
        }
        group.close().await.unwrap();

        assert_eq!(drain.await.unwrap().unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_drain_stops_on_error_without_stalling_producers() {
        let group = BucketGroup::new(2, 4);
        let batches = group.open().unwrap();
        let cancel = CancellationToken::new();

        let drain = {
            let cancel = cancel.clone();
            tokio::spawn(async move { batches.drain(&cancel, FailingProcessor).await })
        };

        for i in 0..20 {
            group.push(i).await.unwrap();
        }
        group.close().await.unwrap();

        let result = drain.await.unwrap();
        assert!(matches!(result, Err(BucketError::ProcessorError(_))));
    }

    #[tokio::test]
    async fn test_drain_cancelled() {
        let group: BucketGroup<i32> = BucketGroup::new(10, 2);
        let batches = group.open().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = batches.drain(&cancel, FailingProcessor).await;
        assert!(matches!(result, Err(BucketError::Cancelled)));
        group.close().await.unwrap();
    }
}
