//! Rendezvous handoff between producers, the relay task and the consumer.
//!
//! Tokio channels always buffer at least one value, so each value travels with
//! a [`oneshot`] acknowledgement that the receiver fires as it takes the
//! value. [`Sender::send`] only resolves once that acknowledgement arrives,
//! which turns the pair into an unbuffered channel: a sender is held until its
//! peer is actually ready.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{mpsc, oneshot};

use super::bucket::Bucket;
use super::types::BucketError;

type Envelope<T> = (T, oneshot::Sender<()>);

pub(crate) fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (Sender { tx }, Receiver { rx })
}

pub(crate) struct Sender<T> {
    tx: mpsc::Sender<Envelope<T>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Sender<T> {
    /// Waits until the receiver has taken `value`.
    pub(crate) async fn send(&self, value: T) -> Result<(), BucketError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send((value, ack_tx))
            .await
            .map_err(|_| BucketError::ChannelClosed)?;
        // The ack sender is dropped unacknowledged if the receiver goes away
        // while the value is still queued.
        ack_rx.await.map_err(|_| BucketError::ChannelClosed)
    }
}

pub(crate) struct Receiver<T> {
    rx: mpsc::Receiver<Envelope<T>>,
}

impl<T> Receiver<T> {
    /// Returns `None` once every sender is gone.
    pub(crate) async fn recv(&mut self) -> Option<T> {
        let (value, ack) = self.rx.recv().await?;
        let _ = ack.send(());
        Some(value)
    }

    fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx).map(|envelope| {
            envelope.map(|(value, ack)| {
                let _ = ack.send(());
                value
            })
        })
    }
}

/// Receive side of a bucket group's output.
///
/// Yields every drained batch in the order the group signaled it, and ends
/// once the group has been closed and everything before the close has been
/// delivered.
pub struct Batches<T> {
    inner: Receiver<Bucket<T>>,
}

impl<T> Batches<T> {
    pub(crate) fn new(inner: Receiver<Bucket<T>>) -> Self {
        Self { inner }
    }

    /// Waits for the next batch. `None` means the group is closed.
    pub async fn recv(&mut self) -> Option<Bucket<T>> {
        self.inner.recv().await
    }
}

impl<T> Stream for Batches<T> {
    type Item = Bucket<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.poll_recv(cx)
    }
}
