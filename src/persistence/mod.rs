//! Best-effort per-host speed persistence.
//!
//! Nothing here returns an error to the caller: saves report a [`SaveOutcome`]
//! that the caller only logs, and loads collapse every failure into `None`.
mod retry;

#[cfg(test)]
mod tests;

use serde_json::Value;

use crate::error::StorageError;
use crate::speed::format_speed;
use crate::storage::{KeyValueStore, RuntimeContext};

pub use retry::{DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES, MAX_RETRIES_LIMIT, RetryPolicy};

pub const DEFAULT_KEY_PREFIX: &str = "speed_";

/// Result of a save; never an error for the caller to propagate.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved { attempts: u32 },
    /// The runtime context was invalid; no write was attempted.
    Skipped,
    Failed { attempts: u32, error: StorageError },
}

impl SaveOutcome {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

#[derive(Debug)]
pub struct SpeedStore<S> {
    store: S,
    context: RuntimeContext,
    retry: RetryPolicy,
    key_prefix: String,
}

impl<S> SpeedStore<S>
where
    S: KeyValueStore,
{
    #[must_use]
    pub fn new(store: S, context: RuntimeContext) -> Self {
        Self {
            store,
            context,
            retry: RetryPolicy::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
        }
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn context(&self) -> &RuntimeContext {
        &self.context
    }

    #[must_use]
    pub fn key_for(&self, hostname: &str) -> String {
        format!("{}{}", self.key_prefix, hostname)
    }

    /// Writes the speed for `hostname`, retrying failed writes with
    /// exponential backoff.
    pub async fn save(&self, hostname: &str, speed: f64) -> SaveOutcome {
        if !self.context.is_valid() {
            tracing::warn!("Extension context invalid, skipping save for {}", hostname);
            return SaveOutcome::Skipped;
        }

        let key = self.key_for(hostname);
        let mut retries = 0u32;
        loop {
            let attempts = retries.saturating_add(1);
            match self.store.set(&key, Value::from(speed)).await {
                Ok(()) => {
                    tracing::info!("Saved speed {} for {}", format_speed(speed), hostname);
                    return SaveOutcome::Saved { attempts };
                }
                Err(err) if retries < self.retry.max_retries => {
                    tracing::warn!(
                        "Save failed (attempt {}/{}), retrying: {}",
                        attempts,
                        self.retry.max_retries.saturating_add(1),
                        err
                    );
                    tokio::time::sleep(self.retry.delay_for(retries)).await;
                    retries = attempts;
                }
                Err(err) => {
                    tracing::error!("Failed to save speed after retries: {}", err);
                    return SaveOutcome::Failed {
                        attempts,
                        error: err,
                    };
                }
            }
        }
    }

    /// Reads the stored speed for `hostname`, if one is recorded and usable.
    pub async fn load(&self, hostname: &str) -> Option<f64> {
        if !self.context.is_valid() {
            tracing::warn!("Extension context invalid, skipping load for {}", hostname);
            return None;
        }

        let key = self.key_for(hostname);
        let mut values = match self.store.get(std::slice::from_ref(&key)).await {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!("Failed to load speed: {}", err);
                return None;
            }
        };
        let value = values.remove(&key)?;
        match value.as_f64() {
            Some(speed) if speed.is_finite() && speed > 0.0 => {
                tracing::info!("Loaded speed {} for {}", format_speed(speed), hostname);
                Some(speed)
            }
            Some(_) | None => {
                tracing::warn!("Ignoring unusable stored speed {} for {}", value, hostname);
                None
            }
        }
    }
}
