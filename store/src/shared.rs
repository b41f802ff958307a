use crate::entry::StoreEntry;
use crate::metrics::Metrics;
use crate::task::janitor::{self, Janitor};

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

/// The key to entry map, guarded by the store's single reader-writer lock.
pub(crate) type StoreMap<V, H> = RwLock<HashMap<String, StoreEntry<V>, H>>;

/// The internal, thread-safe core of the store.
pub(crate) struct StoreShared<V, H> {
  /// Shared with the janitor thread, which sweeps the same map under the
  /// same lock.
  pub(crate) map: Arc<StoreMap<V, H>>,
  pub(crate) metrics: Arc<Metrics>,
  pub(crate) hasher: H,
  /// `Some` while a janitor has been started and not yet stopped.
  pub(crate) janitor: Mutex<Option<Janitor>>,
}

impl<V, H> fmt::Debug for StoreShared<V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StoreShared")
      .field("len", &self.map.read().len())
      .field("janitor", &self.janitor.lock().is_some())
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<V, H> Drop for StoreShared<V, H> {
  fn drop(&mut self) {
    if let Some(janitor) = self.janitor.get_mut().take() {
      janitor.stop();
    }
  }
}

impl<V, H> StoreShared<V, H>
where
  V: Send + Sync + 'static,
  H: Send + Sync + 'static,
{
  pub(crate) fn new(hasher: H, initial_capacity: usize) -> Self
  where
    H: Clone,
  {
    Self {
      map: Arc::new(RwLock::new(HashMap::with_capacity_and_hasher(
        initial_capacity,
        hasher.clone(),
      ))),
      metrics: Arc::new(Metrics::new()),
      hasher,
      janitor: Mutex::new(None),
    }
  }

  /// Starts a janitor unless one is already running. A janitor whose thread
  /// died from a panicking sweep does not count as running and is replaced.
  pub(crate) fn start_janitor(&self, interval: Duration)
  where
    H: BuildHasher,
  {
    if interval.is_zero() {
      tracing::warn!("ignoring request to start store cleanup with a zero interval");
      return;
    }

    let mut slot = self.janitor.lock();
    if let Some(existing) = slot.as_ref() {
      if !existing.is_finished() {
        tracing::trace!(
          interval = ?existing.tick_interval(),
          "store cleanup already running"
        );
        return;
      }
    }
    if let Some(dead) = slot.take() {
      dead.stop();
    }

    let map = self.map.clone();
    let metrics = self.metrics.clone();
    match Janitor::spawn(interval, move || {
      janitor::remove_expired(&map, &metrics);
    }) {
      Ok(janitor) => {
        tracing::debug!(?interval, "store cleanup started");
        *slot = Some(janitor);
      }
      Err(error) => {
        tracing::warn!(%error, "failed to spawn store janitor thread");
      }
    }
  }

  /// Stops the janitor, if any, and waits for its thread to exit.
  pub(crate) fn stop_janitor(&self) {
    // The slot stays locked until the old thread is gone, so a concurrent
    // start never overlaps with it.
    let mut slot = self.janitor.lock();
    if let Some(janitor) = slot.take() {
      janitor.stop();
      tracing::debug!("store cleanup stopped");
    }
  }

  pub(crate) fn janitor_running(&self) -> bool {
    self
      .janitor
      .lock()
      .as_ref()
      .is_some_and(|janitor| !janitor.is_finished())
  }
}
