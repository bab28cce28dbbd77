use std::rc::Rc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use super::{RetryPolicy, SaveOutcome, SpeedStore};
use crate::storage::{FlakyStore, MemoryStore, RuntimeContext};

fn flaky_speed_store() -> (Rc<FlakyStore<MemoryStore>>, SpeedStore<Rc<FlakyStore<MemoryStore>>>) {
    let store = Rc::new(FlakyStore::new(MemoryStore::new()));
    let speeds = SpeedStore::new(store.clone(), RuntimeContext::new());
    (store, speeds)
}

/// Paused-clock timers fire on millisecond ticks, so allow a tick per sleep.
fn within_tick(elapsed: Duration, millis: u64) -> bool {
    elapsed >= Duration::from_millis(millis) && elapsed < Duration::from_millis(millis + 5)
}

#[test]
fn backoff_doubles_from_base() -> Result<(), String> {
    let policy = RetryPolicy::default();
    let delays: Vec<u128> = (0..3).map(|retry| policy.delay_for(retry).as_millis()).collect();
    if delays != [100, 200, 400] {
        return Err(format!("Unexpected delays: {:?}", delays));
    }
    if policy.total_backoff() != Duration::from_millis(700) {
        return Err(format!("Unexpected total: {:?}", policy.total_backoff()));
    }
    Ok(())
}

#[test]
fn storage_key_is_namespaced_by_host() -> Result<(), String> {
    let speeds = SpeedStore::new(MemoryStore::new(), RuntimeContext::new());
    if speeds.key_for("example.com") != "speed_example.com" {
        return Err(format!("Unexpected key: {}", speeds.key_for("example.com")));
    }
    let custom = speeds.with_key_prefix("looper:");
    if custom.key_for("a.org") != "looper:a.org" {
        return Err(format!("Unexpected key: {}", custom.key_for("a.org")));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn save_succeeds_first_try() -> Result<(), String> {
    let (store, speeds) = flaky_speed_store();
    let outcome = speeds.save("example.com", 1.5).await;
    if !outcome.is_saved() || !matches!(outcome, SaveOutcome::Saved { attempts: 1 }) {
        return Err(format!("Unexpected outcome: {:?}", outcome));
    }
    if store.inner().value("speed_example.com") != Some(json!(1.5)) {
        return Err("Expected stored speed".to_owned());
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn save_recovers_after_transient_failures() -> Result<(), String> {
    let (store, speeds) = flaky_speed_store();
    store.fail_writes(2);
    let started = Instant::now();
    let outcome = speeds.save("example.com", 2.0).await;
    if !matches!(outcome, SaveOutcome::Saved { attempts: 3 }) {
        return Err(format!("Unexpected outcome: {:?}", outcome));
    }
    if !within_tick(started.elapsed(), 300) {
        return Err(format!("Unexpected backoff: {:?}", started.elapsed()));
    }
    if store.inner().value("speed_example.com") != Some(json!(2.0)) {
        return Err("Expected stored speed".to_owned());
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn save_gives_up_after_three_retries() -> Result<(), String> {
    let (store, speeds) = flaky_speed_store();
    store.fail_writes(10);
    let started = Instant::now();
    let outcome = speeds.save("example.com", 2.5).await;
    if !matches!(outcome, SaveOutcome::Failed { attempts: 4, .. }) {
        return Err(format!("Unexpected outcome: {:?}", outcome));
    }
    if store.write_attempts() != 4 {
        return Err(format!("Unexpected attempts: {}", store.write_attempts()));
    }
    if !within_tick(started.elapsed(), 700) {
        return Err(format!("Unexpected backoff: {:?}", started.elapsed()));
    }
    if store.inner().value("speed_example.com").is_some() {
        return Err("Expected nothing stored".to_owned());
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn invalid_context_skips_storage_entirely() -> Result<(), String> {
    let (store, speeds) = flaky_speed_store();
    speeds.context().invalidate();
    let outcome = speeds.save("example.com", 1.25).await;
    if !matches!(outcome, SaveOutcome::Skipped) {
        return Err(format!("Unexpected outcome: {:?}", outcome));
    }
    if speeds.load("example.com").await.is_some() {
        return Err("Expected absent load".to_owned());
    }
    if store.write_attempts() != 0 || store.read_attempts() != 0 {
        return Err("Expected no storage calls".to_owned());
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn load_returns_stored_speed() -> Result<(), String> {
    let store = MemoryStore::with_values([("speed_example.com".to_owned(), json!(1.5))]);
    let speeds = SpeedStore::new(store, RuntimeContext::new());
    match speeds.load("example.com").await {
        Some(speed) if (speed - 1.5).abs() < f64::EPSILON => Ok(()),
        other => Err(format!("Unexpected load: {:?}", other)),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn load_failure_is_absent_without_retry() -> Result<(), String> {
    let (store, speeds) = flaky_speed_store();
    store.fail_reads(1);
    if speeds.load("example.com").await.is_some() {
        return Err("Expected absent load".to_owned());
    }
    if store.read_attempts() != 1 {
        return Err(format!("Expected a single read, got {}", store.read_attempts()));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn load_ignores_unusable_values() -> Result<(), String> {
    for value in [json!(0), json!(-2.0), json!("fast"), json!(null)] {
        let store = MemoryStore::with_values([("speed_example.com".to_owned(), value.clone())]);
        let speeds = SpeedStore::new(store, RuntimeContext::new());
        if let Some(speed) = speeds.load("example.com").await {
            return Err(format!("Expected {} to be ignored, got {}", value, speed));
        }
    }
    Ok(())
}
