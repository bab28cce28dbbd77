use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;

use super::{KeyValueStore, StoredValues};

/// Store kept entirely in memory; shared with `Rc` it outlives page reloads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<StoredValues>,
    writes: Cell<u64>,
    reads: Cell<u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            values: RefCell::new(values.into_iter().collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoredValues {
        self.values.borrow().clone()
    }

    /// Number of `set` calls that reached this store.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.writes.get()
    }

    /// Number of `get` calls that reached this store.
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.writes.set(self.writes.get().saturating_add(1));
        self.values.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }

    async fn get(&self, keys: &[String]) -> Result<StoredValues, StorageError> {
        self.reads.set(self.reads.get().saturating_add(1));
        let values = self.values.borrow();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }
}
