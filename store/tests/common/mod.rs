#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use fibre_store::{StoreError, TtlStore};

pub const SHORT_TTL: Duration = Duration::from_millis(100);
pub const JANITOR_TICK: Duration = Duration::from_millis(20);
pub const SLEEP_MARGIN: Duration = Duration::from_millis(150);

pub fn build_test_store() -> TtlStore<String> {
  TtlStore::new()
}

/// Polls `get` until it reports `KeyNotFound` or `timeout` elapses.
/// Returns the last error seen.
pub fn wait_until_swept<V>(store: &TtlStore<V>, key: &str, timeout: Duration) -> Option<StoreError>
where
  V: Send + Sync + 'static,
{
  let deadline = Instant::now() + timeout;
  loop {
    let last = store.get(key).err();
    if last == Some(StoreError::KeyNotFound) || Instant::now() >= deadline {
      return last;
    }
    thread::sleep(Duration::from_millis(5));
  }
}
