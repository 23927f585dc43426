//! Bucket group example draining batches through a processor.
//!
//! Run with: cargo run --example simple_group

use async_trait::async_trait;
use bucket_group::bucket::{BucketError, BucketGroup, ConfigBuilder, Processor};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Simple processor that prints batch information
struct PrintingProcessor;

#[async_trait]
impl Processor<i32> for PrintingProcessor {
    async fn process(&self, _ctx: &CancellationToken, items: &[i32]) -> Result<(), BucketError> {
        println!("Processing batch of {} items: {:?}", items.len(), items);
        // Simulate a slow sink
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = ConfigBuilder::default()
        .threshold(10usize)
        .pool_size(4usize)
        .build()?;

    let group = BucketGroup::with_config(config);
    let batches = group.open()?;
    let cancel = CancellationToken::new();

    println!("Pushing 55 items into buckets of 10...\n");

    let drain = {
        let cancel = cancel.clone();
        tokio::spawn(async move { batches.drain(&cancel, PrintingProcessor).await })
    };

    for i in 0..55 {
        group.push(i).await?;
    }
    group.close().await?;

    let processed = drain.await??;
    println!("\nProcessed {processed} batches");
    Ok(())
}
