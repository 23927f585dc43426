use thiserror::Error;

/// Errors returned by buckets, bucket groups and batch draining.
#[derive(Debug, Error)]
pub enum BucketError {
    /// [`BucketGroup::open`](super::BucketGroup::open) was called more than once.
    #[error("bucket group already open")]
    AlreadyOpen,

    /// The group no longer accepts items, or `close` was called twice.
    #[error("bucket group already closed")]
    AlreadyClosed,

    /// `open` was called outside a tokio runtime, so the relay could not start.
    #[error("no tokio runtime to run the relay task")]
    NoRuntime,

    /// The other side of a handoff channel went away.
    #[error("channel closed")]
    ChannelClosed,

    /// Draining was cancelled via the cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// A batch processor failed with an error.
    ///
    /// Preserves the source error for debugging.
    #[error("processor failed")]
    ProcessorError(#[source] Box<dyn std::error::Error + Send + Sync>),
}
