//! # bucket-group
//!
//! A concurrent batching buffer built on Tokio. Producers push items into a
//! fixed pool of buckets; every full bucket is snapshotted, reset and handed
//! to a single consumer without blocking producers on the consumer's I/O.
//!
//! ## Features
//!
//! - **Lock-per-bucket storage** with atomic snapshot-and-reset
//! - **Rotating pool** of buckets drained in fill order
//! - **Unbuffered handoff** so a slow consumer applies natural backpressure
//! - **Graceful close** that flushes the partially filled bucket
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bucket_group::bucket::BucketGroup;
//!
//! let group = BucketGroup::new(100, 10);
//! let mut batches = group.open()?;
//!
//! tokio::spawn(async move {
//!     while let Some(batch) = batches.recv().await {
//!         println!("got {} items", batch.len());
//!     }
//! });
//!
//! for i in 0..1000 {
//!     group.push(i).await?;
//! }
//! group.close().await?;
//! ```
//!
//! ## Modules
//!
//! - [`bucket`] - Buckets, the bucket group and batch draining

pub mod bucket;
