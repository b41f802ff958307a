use crate::entry::StoreEntry;
use crate::error::{Result, StoreError};
use crate::metrics::MetricsSnapshot;
use crate::shared::StoreShared;
use crate::task::janitor;
use crate::time;
use crate::ttl::Ttl;

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::mem;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// A thread-safe key-value store with per-entry time-to-live.
///
/// Cloning a `TtlStore` is cheap and yields another handle to the same
/// entries and the same cleanup janitor. The janitor is stopped when the last
/// handle is dropped.
pub struct TtlStore<V, H = ahash::RandomState> {
  pub(crate) shared: Arc<StoreShared<V, H>>,
}

impl<V, H> Clone for TtlStore<V, H> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<V, H> fmt::Debug for TtlStore<V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TtlStore")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<V: Send + Sync + 'static> TtlStore<V> {
  /// Creates an empty store with the default hasher and no background cleanup.
  pub fn new() -> Self {
    Self {
      shared: Arc::new(StoreShared::new(ahash::RandomState::new(), 0)),
    }
  }
}

impl<V: Send + Sync + 'static> Default for TtlStore<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V, H> TtlStore<V, H>
where
  V: Send + Sync + 'static,
  H: BuildHasher + Clone + Send + Sync + 'static,
{
  /// Inserts or replaces the value for `key`.
  ///
  /// A zero `ttl` means the entry never expires. Otherwise the expiry is fixed
  /// now, at call time, as `now + ttl`.
  ///
  /// # Errors
  ///
  /// - [`StoreError::EmptyKey`] if `key` is the empty string.
  /// - [`StoreError::NegativeTtl`] if `ttl` is below zero.
  pub fn set(&self, key: impl Into<String>, value: V, ttl: impl Into<Ttl>) -> Result<()> {
    self.set_arc(key, Arc::new(value), ttl)
  }

  /// Like [`set`](Self::set), but stores an existing `Arc` so the caller can
  /// keep its own handle to the value.
  pub fn set_arc(&self, key: impl Into<String>, value: Arc<V>, ttl: impl Into<Ttl>) -> Result<()> {
    let key = key.into();
    if key.is_empty() {
      return Err(StoreError::EmptyKey);
    }
    let ttl = ttl.into().to_duration()?;

    let entry = StoreEntry::new(value, ttl);
    let previous = self.shared.map.write().insert(key, entry);
    self.shared.metrics.inserts.fetch_add(1, Ordering::Relaxed);

    // Any replaced value is dropped here, after the write lock is released.
    drop(previous);
    Ok(())
  }

  /// Fetches the value for `key`, returning the same `Arc` it was stored with.
  ///
  /// Only the read lock is taken. An expired entry that has not been swept
  /// yet is reported as [`StoreError::KeyExpired`] and left in place.
  ///
  /// # Errors
  ///
  /// - [`StoreError::KeyNotFound`] if there is no entry for `key`.
  /// - [`StoreError::KeyExpired`] if the entry's TTL has lapsed.
  pub fn get(&self, key: &str) -> Result<Arc<V>> {
    // Scope the read guard to release the lock as soon as possible.
    let found = {
      let guard = self.shared.map.read();
      guard
        .get(key)
        .map(|entry| (entry.value(), entry.expires_at()))
    };

    let metrics = &self.shared.metrics;
    let Some((value, expires_at)) = found else {
      metrics.misses.fetch_add(1, Ordering::Relaxed);
      return Err(StoreError::KeyNotFound);
    };

    if time::is_expired_at(expires_at, time::now_nanos()) {
      metrics.expired_reads.fetch_add(1, Ordering::Relaxed);
      return Err(StoreError::KeyExpired);
    }

    metrics.hits.fetch_add(1, Ordering::Relaxed);
    Ok(value)
  }

  /// Returns `true` if `key` holds an entry that has not expired.
  /// Does not touch the hit/miss metrics.
  pub fn contains_key(&self, key: &str) -> bool {
    let now = time::now_nanos();
    self
      .shared
      .map
      .read()
      .get(key)
      .is_some_and(|entry| !time::is_expired_at(entry.expires_at(), now))
  }

  /// Removes the entry for `key`, if any. Deleting an absent key is a no-op.
  pub fn delete(&self, key: &str) {
    let removed = self.shared.map.write().remove(key);
    if removed.is_some() {
      self.shared.metrics.deletions.fetch_add(1, Ordering::Relaxed);
    }
  }

  /// Discards every entry. A running cleanup janitor keeps running.
  pub fn reset(&self) {
    let fresh = HashMap::with_hasher(self.shared.hasher.clone());
    let old = mem::replace(&mut *self.shared.map.write(), fresh);
    self.shared.metrics.resets.fetch_add(1, Ordering::Relaxed);

    // The old entries are dropped without holding the lock.
    drop(old);
  }

  /// Starts a background thread that removes expired entries every
  /// `interval`. The first sweep happens one interval from now.
  ///
  /// Calling this while cleanup is already running does nothing; the
  /// existing interval is kept. A zero `interval` is ignored with a warning.
  pub fn start_cleanup(&self, interval: Duration) {
    self.shared.start_janitor(interval);
  }

  /// Stops the background cleanup and waits for its thread to exit. A sweep
  /// already in progress is completed first. Does nothing if cleanup is not
  /// running.
  pub fn stop_cleanup(&self) {
    self.shared.stop_janitor();
  }

  /// Returns `true` while a cleanup thread is active.
  ///
  /// This turns `false` after [`stop_cleanup`](Self::stop_cleanup), and also
  /// if a sweep panicked and the thread terminated.
  pub fn is_cleanup_running(&self) -> bool {
    self.shared.janitor_running()
  }

  /// Runs one sweep on the calling thread and returns how many expired
  /// entries it removed.
  pub fn purge_expired(&self) -> usize {
    janitor::remove_expired(&self.shared.map, &self.shared.metrics)
  }

  /// The number of entries held, including expired ones not yet swept.
  pub fn len(&self) -> usize {
    self.shared.map.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}
