use crate::time::{self, NO_EXPIRY};

use std::sync::Arc;
use std::time::Duration;

/// A container for a value in the store, holding its expiry metadata.
#[derive(Debug)]
pub(crate) struct StoreEntry<V> {
  /// The user's value, wrapped in an Arc for shared ownership.
  value: Arc<V>,
  /// The expiration timestamp in nanoseconds since the store epoch.
  /// `NO_EXPIRY` means no TTL.
  expires_at: u64,
}

impl<V> StoreEntry<V> {
  /// Creates a new `StoreEntry`, computing the expiry from `ttl` right now.
  pub(crate) fn new(value: Arc<V>, ttl: Duration) -> Self {
    Self {
      value,
      expires_at: time::expiry_after(ttl),
    }
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  #[inline]
  pub(crate) fn expires_at(&self) -> u64 {
    self.expires_at
  }

  /// Sweep-side check: the entry is due for removal once `now` has reached
  /// its expiry.
  #[inline]
  pub(crate) fn is_due_at(&self, now: u64) -> bool {
    self.expires_at != NO_EXPIRY && self.expires_at <= now
  }
}
