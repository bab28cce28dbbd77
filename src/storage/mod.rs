//! Key-value persistence service consumed by the speed adapter.
//!
//! The shape mirrors an extension storage area: values are JSON, `get` takes a
//! batch of keys and returns only the ones present, and the whole service can
//! be torn down underneath the page (see [`RuntimeContext`]).
mod context;
mod file;
mod flaky;
mod memory;


use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;

pub use context::RuntimeContext;
pub use file::FileStore;
pub use flaky::FlakyStore;
pub use memory::MemoryStore;

/// Mapping returned by [`KeyValueStore::get`]; absent keys are simply missing.
pub type StoredValues = BTreeMap<String, Value>;

#[async_trait(?Send)]
pub trait KeyValueStore {
    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend refuses or fails the write.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Reads the subset of `keys` the store currently holds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    async fn get(&self, keys: &[String]) -> Result<StoredValues, StorageError>;
}

#[async_trait(?Send)]
impl<S> KeyValueStore for std::rc::Rc<S>
where
    S: KeyValueStore + ?Sized,
{
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn get(&self, keys: &[String]) -> Result<StoredValues, StorageError> {
        (**self).get(keys).await
    }
}
