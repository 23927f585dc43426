pub mod bucket;
pub mod config;
pub mod group;
pub mod handoff;
pub mod processor;
pub mod types;

pub use bucket::Bucket;
pub use config::{Config, ConfigBuilder};
pub use group::BucketGroup;
pub use handoff::Batches;
pub use processor::Processor;
pub use types::BucketError;
