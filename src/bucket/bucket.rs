use std::collections::VecDeque;
use std::fmt;

use parking_lot::RwLock;

use super::types::BucketError;

/// Thread-safe ordered storage for items waiting to be drained.
///
/// Reads (`len`, `to_vec`, `clone`) take a shared lock, mutations take the
/// exclusive one, so a reader never sees a half-applied push or reset.
pub struct Bucket<T> {
    data: RwLock<VecDeque<T>>,
}

impl<T> Bucket<T> {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(VecDeque::new()),
        }
    }

    /// Appends `item` and returns the resulting length.
    pub fn push(&self, item: T) -> Result<usize, BucketError> {
        let mut data = self.data.write();
        data.push_back(item);
        Ok(data.len())
    }

    /// Removes the oldest item, or returns `None` when the bucket is empty.
    pub fn pop(&self) -> Result<Option<T>, BucketError> {
        Ok(self.data.write().pop_front())
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Drops every item by swapping in fresh storage.
    pub fn reset(&self) {
        *self.data.write() = VecDeque::new();
    }

    /// Moves the contents into a new bucket and empties this one.
    ///
    /// Both steps happen under one write lock: a concurrent push lands either
    /// in the returned bucket or in `self`, never in both or neither.
    pub fn clone_and_reset(&self) -> Bucket<T> {
        let taken = std::mem::take(&mut *self.data.write());
        Bucket {
            data: RwLock::new(taken),
        }
    }

    /// Consumes the bucket, returning its items in insertion order.
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_inner().into()
    }
}

impl<T: Clone> Bucket<T> {
    /// Copies the items in insertion order without mutating the bucket.
    pub fn to_vec(&self) -> Result<Vec<T>, BucketError> {
        Ok(self.data.read().iter().cloned().collect())
    }
}

impl<T> Default for Bucket<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Bucket<T> {
    fn clone(&self) -> Self {
        Self {
            data: RwLock::new(self.data.read().clone()),
        }
    }
}

impl<T> From<Vec<T>> for Bucket<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            data: RwLock::new(items.into()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Bucket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("data", &*self.data.read())
            .finish()
    }
}
