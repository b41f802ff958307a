use crate::error::BuildError;
use crate::handles::TtlStore;
use crate::shared::StoreShared;

use core::fmt;
use std::hash::BuildHasher;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// A builder for creating `TtlStore` instances.
pub struct StoreBuilder<V, H = ahash::RandomState> {
  initial_capacity: usize,
  cleanup_interval: Option<Duration>,
  hasher: H,
  _value_marker: PhantomData<V>,
}

// Manual Debug implementation so `V` and `H` need not be Debug.
impl<V, H> fmt::Debug for StoreBuilder<V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StoreBuilder")
      .field("initial_capacity", &self.initial_capacity)
      .field("cleanup_interval", &self.cleanup_interval)
      .finish_non_exhaustive()
  }
}

// --- General Configuration Methods ---
impl<V, H> StoreBuilder<V, H> {
  /// Pre-sizes the map for `capacity` entries. This is not a limit.
  pub fn initial_capacity(mut self, capacity: usize) -> Self {
    self.initial_capacity = capacity;
    self
  }

  /// Starts the background cleanup as soon as the store is built, sweeping
  /// expired entries every `interval`.
  ///
  /// Without this, the store only expires lazily until
  /// [`TtlStore::start_cleanup`] is called.
  pub fn cleanup_interval(mut self, interval: Duration) -> Self {
    self.cleanup_interval = Some(interval);
    self
  }

  /// Sets the hasher used by the store's map.
  pub fn hasher<NewH>(self, hasher: NewH) -> StoreBuilder<V, NewH> {
    StoreBuilder {
      initial_capacity: self.initial_capacity,
      cleanup_interval: self.cleanup_interval,
      hasher,
      _value_marker: PhantomData,
    }
  }
}

// --- Default Constructor ---
impl<V, H: BuildHasher + Default> StoreBuilder<V, H> {
  /// Creates a new `StoreBuilder` with default settings: no pre-sizing and no
  /// background cleanup.
  pub fn new() -> Self {
    Self {
      initial_capacity: 0,
      cleanup_interval: None,
      hasher: H::default(),
      _value_marker: PhantomData,
    }
  }
}

impl<V> Default for StoreBuilder<V, ahash::RandomState> {
  fn default() -> Self {
    Self::new()
  }
}

// --- Build Methods ---
impl<V, H> StoreBuilder<V, H>
where
  V: Send + Sync + 'static,
  H: BuildHasher + Clone + Send + Sync + 'static,
{
  /// Builds the store, starting its janitor if a cleanup interval was set.
  pub fn build(self) -> Result<TtlStore<V, H>, BuildError> {
    self.validate()?;

    let shared = StoreShared::new(self.hasher, self.initial_capacity);
    if let Some(interval) = self.cleanup_interval {
      shared.start_janitor(interval);
    }

    Ok(TtlStore {
      shared: Arc::new(shared),
    })
  }

  /// Validates the builder configuration.
  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    if self.cleanup_interval.is_some_and(|interval| interval.is_zero()) {
      return Err(BuildError::ZeroCleanupInterval);
    }
    Ok(())
  }
}
