// src/bucket/config.rs

use derive_builder::Builder;

/// Items per bucket used when the caller passes zero or nothing.
pub const DEFAULT_THRESHOLD: usize = 1 << 6;

/// Buckets per group used when the caller passes zero or nothing.
pub const DEFAULT_POOL_SIZE: usize = 1 << 6;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    /// Number of items that make a bucket full and ready to drain
    #[builder(default = "DEFAULT_THRESHOLD")]
    pub(crate) threshold: usize,

    /// Number of buckets rotated by the group
    #[builder(default = "DEFAULT_POOL_SIZE")]
    pub(crate) pool_size: usize,
}

impl Config {
    /// Creates a config, mapping a zero threshold or pool size to the default.
    pub fn new(threshold: usize, pool_size: usize) -> Self {
        Config {
            threshold,
            pool_size,
        }
        .normalized()
    }

    /// Returns the number of items that trigger a drain
    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the number of buckets in the pool
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub(crate) fn normalized(mut self) -> Self {
        if self.threshold == 0 {
            self.threshold = DEFAULT_THRESHOLD;
        }
        if self.pool_size == 0 {
            self.pool_size = DEFAULT_POOL_SIZE;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_THRESHOLD, DEFAULT_POOL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_maps_to_default() {
        let config = Config::new(0, 0);
        assert_eq!(config.threshold(), 64);
        assert_eq!(config.pool_size(), 64);

        let config = Config::new(100, 10);
        assert_eq!(config.threshold(), 100);
        assert_eq!(config.pool_size(), 10);
    }

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::default().threshold(5usize).build().unwrap();
        assert_eq!(config.threshold(), 5);
        assert_eq!(config.pool_size(), DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_default_uses_separate_constants() {
        let config = Config::default();
        assert_eq!(config.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(config.pool_size(), DEFAULT_POOL_SIZE);

        let config = ConfigBuilder::default().build().unwrap();
        assert_eq!(config.threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_builder_zero_is_normalized_later() {
        let config = ConfigBuilder::default()
            .pool_size(0usize)
            .build()
            .unwrap()
            .normalized();
        assert_eq!(config.pool_size(), DEFAULT_POOL_SIZE);
    }
}
