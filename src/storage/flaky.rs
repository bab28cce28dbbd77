use std::cell::Cell;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{StorageError, StorageOperation};

use super::{KeyValueStore, StoredValues};

/// Wrapper that fails a configurable number of upcoming calls before
/// delegating to the inner store.
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    failing_writes: Cell<u32>,
    failing_reads: Cell<u32>,
    write_attempts: Cell<u64>,
    read_attempts: Cell<u64>,
}

impl<S> FlakyStore<S> {
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            failing_writes: Cell::new(0),
            failing_reads: Cell::new(0),
            write_attempts: Cell::new(0),
            read_attempts: Cell::new(0),
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Fails the next `count` writes (adds to any already queued).
    pub fn fail_writes(&self, count: u32) {
        self.failing_writes
            .set(self.failing_writes.get().saturating_add(count));
    }

    pub fn fail_reads(&self, count: u32) {
        self.failing_reads
            .set(self.failing_reads.get().saturating_add(count));
    }

    /// Every `set` call observed, including injected failures.
    #[must_use]
    pub fn write_attempts(&self) -> u64 {
        self.write_attempts.get()
    }

    #[must_use]
    pub fn read_attempts(&self) -> u64 {
        self.read_attempts.get()
    }

    fn take_failure(counter: &Cell<u32>) -> bool {
        let remaining = counter.get();
        if remaining == 0 {
            return false;
        }
        counter.set(remaining.saturating_sub(1));
        true
    }
}

#[async_trait(?Send)]
impl<S> KeyValueStore for FlakyStore<S>
where
    S: KeyValueStore,
{
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.write_attempts
            .set(self.write_attempts.get().saturating_add(1));
        if Self::take_failure(&self.failing_writes) {
            return Err(StorageError::Injected {
                operation: StorageOperation::Set,
            });
        }
        self.inner.set(key, value).await
    }

    async fn get(&self, keys: &[String]) -> Result<StoredValues, StorageError> {
        self.read_attempts
            .set(self.read_attempts.get().saturating_add(1));
        if Self::take_failure(&self.failing_reads) {
            return Err(StorageError::Injected {
                operation: StorageOperation::Get,
            });
        }
        self.inner.get(keys).await
    }
}
