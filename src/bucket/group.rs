use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::bucket::Bucket;
use super::config::Config;
use super::handoff::{self, Batches};
use super::types::BucketError;

/// Fans pushed items into a fixed pool of [`Bucket`]s and hands every full
/// bucket to a single consumer.
///
/// Items go to the bucket at the write index. When that bucket reaches the
/// threshold both the write index and the pop index move one slot forward and
/// the pop index is signaled to a relay task, which snapshots and resets the
/// slot and forwards the snapshot through [`Batches`].
///
/// Both handoffs are unbuffered: the producer that fills a bucket waits for
/// the relay, and the relay waits for the consumer.
///
/// Concurrent producers that all see the same bucket at or past the threshold
/// each advance the indices and each signal. Under heavy contention a slot can
/// therefore be signaled twice or skipped.
pub struct BucketGroup<T> {
    config: Config,
    pools: Arc<[Bucket<T>]>,
    current_index: AtomicUsize,
    pop_index: AtomicUsize,
    is_open: AtomicBool,
    /// `None` once the group is closed.
    signal_tx: RwLock<Option<handoff::Sender<usize>>>,
    signal_rx: Mutex<Option<handoff::Receiver<usize>>>,
    complete: CancellationToken,
}

impl<T> BucketGroup<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a group of `pool_size` buckets, each drained at `threshold`
    /// items. Zero selects the default of 64 for either argument.
    pub fn new(threshold: usize, pool_size: usize) -> Self {
        Self::with_config(Config::new(threshold, pool_size))
    }

    pub fn with_config(config: Config) -> Self {
        let config = config.normalized();
        let pools: Arc<[Bucket<T>]> = (0..config.pool_size).map(|_| Bucket::new()).collect();
        let (signal_tx, signal_rx) = handoff::channel();

        Self {
            // The first crossing advances the pop index onto slot 0.
            pop_index: AtomicUsize::new(config.pool_size - 1),
            current_index: AtomicUsize::new(0),
            config,
            pools,
            is_open: AtomicBool::new(false),
            signal_tx: RwLock::new(Some(signal_tx)),
            signal_rx: Mutex::new(Some(signal_rx)),
            complete: CancellationToken::new(),
        }
    }

    /// Starts the relay task and returns the stream of drained batches.
    ///
    /// Must be called from within a tokio runtime, otherwise it fails with
    /// [`BucketError::NoRuntime`] and the group stays unopened. Only the first
    /// successful call opens the group.
    pub fn open(&self) -> Result<Batches<T>, BucketError> {
        let runtime = Handle::try_current().map_err(|_| BucketError::NoRuntime)?;
        if self
            .is_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BucketError::AlreadyOpen);
        }
        let signals = self.signal_rx.lock().take().ok_or(BucketError::AlreadyOpen)?;

        let (batch_tx, batch_rx) = handoff::channel();
        runtime.spawn(relay(
            Arc::clone(&self.pools),
            signals,
            batch_tx,
            self.complete.clone(),
        ));

        debug!(
            threshold = self.config.threshold,
            pool_size = self.config.pool_size,
            "bucket group opened"
        );
        Ok(Batches::new(batch_rx))
    }

    /// Adds `item` to the current bucket.
    ///
    /// Suspends only when this item fills the bucket, until the relay task
    /// has accepted the drain signal.
    pub async fn push(&self, item: T) -> Result<(), BucketError> {
        let (signals, index) = {
            let guard = self.signal_tx.read();
            let signals = guard.as_ref().ok_or(BucketError::AlreadyClosed)?;

            let current = self.current_index.load(Ordering::Acquire);
            let len = self.pools[current].push(item)?;
            if len < self.config.threshold {
                return Ok(());
            }

            advance(&self.current_index, self.pools.len());
            let index = advance(&self.pop_index, self.pools.len());
            trace!(bucket = index, len, "bucket reached threshold");
            (signals.clone(), index)
        };

        signals.send(index).await
    }

    /// Length of the bucket currently receiving pushes.
    pub fn len(&self) -> usize {
        self.pools[self.current_index.load(Ordering::Acquire)].len()
    }

    /// Whether the bucket currently receiving pushes is empty.
    pub fn is_empty(&self) -> bool {
        self.pools[self.current_index.load(Ordering::Acquire)].is_empty()
    }

    /// Stops accepting items, flushes the current bucket and waits until the
    /// relay has delivered everything and closed the output.
    ///
    /// If the group was never opened there is no relay to drain it: the group
    /// is marked closed, anything already pushed is dropped with it, and this
    /// returns immediately.
    pub async fn close(&self) -> Result<(), BucketError> {
        let signals = self.signal_tx.write().take();
        let Some(signals) = signals else {
            return Err(BucketError::AlreadyClosed);
        };
        if !self.is_open() {
            debug!("bucket group closed before open");
            return Ok(());
        }

        let current = self.current_index.load(Ordering::Acquire);
        let pending = self.pools[current].len();
        if pending > 0 {
            debug!(bucket = current, pending, "flushing partial bucket");
            signals.send(current).await?;
        }
        signals.send((current + 1) % self.pools.len()).await?;
        drop(signals);

        self.complete.cancelled().await;
        debug!("bucket group closed");
        Ok(())
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.config.threshold
    }

    #[inline]
    pub fn pool_size(&self) -> usize {
        self.pools.len()
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.signal_tx.read().is_none()
    }
}

/// Moves `index` one slot forward modulo `len` and returns the new value.
fn advance(index: &AtomicUsize, len: usize) -> usize {
    let prev = index
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
        .unwrap_or_else(|i| i);
    (prev + 1) % len
}

async fn relay<T>(
    pools: Arc<[Bucket<T>]>,
    mut signals: handoff::Receiver<usize>,
    batches: handoff::Sender<Bucket<T>>,
    complete: CancellationToken,
) {
    trace!("relay started");
    let mut consumer_gone = false;

    while let Some(index) = signals.recv().await {
        let batch = pools[index].clone_and_reset();
        if batch.is_empty() || consumer_gone {
            continue;
        }

        let len = batch.len();
        match batches.send(batch).await {
            Ok(()) => trace!(bucket = index, len, "batch delivered"),
            Err(_) => {
                warn!("batch receiver dropped, discarding remaining batches");
                consumer_gone = true;
            }
        }
    }

    drop(batches);
    complete.cancel();
    trace!("relay stopped");
}
