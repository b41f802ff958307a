use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single, static reference point for all expiry timestamps in the store.
// It is initialized lazily on its first use.
static STORE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Timestamp value meaning "never expires".
pub(crate) const NO_EXPIRY: u64 = 0;

/// Converts an `Instant` into nanoseconds since the store's epoch.
///
/// The result is offset by one so that a reading taken exactly at the epoch
/// can never collide with [`NO_EXPIRY`].
#[inline]
pub(crate) fn instant_to_nanos(instant: Instant) -> u64 {
  let since = instant.saturating_duration_since(*STORE_EPOCH);
  u64::try_from(since.as_nanos())
    .unwrap_or(u64::MAX)
    .saturating_add(1)
}

/// Read-side check: an expiry is lapsed once `now` is strictly past it.
/// Sweeps use the inclusive `StoreEntry::is_due_at` instead.
#[inline]
pub(crate) fn is_expired_at(expires_at: u64, now: u64) -> bool {
  expires_at != NO_EXPIRY && expires_at < now
}

/// The current time as nanoseconds since the epoch.
#[inline]
pub(crate) fn now_nanos() -> u64 {
  instant_to_nanos(Instant::now())
}

/// The absolute timestamp at which an entry written now with `ttl` expires.
/// A zero `ttl` yields [`NO_EXPIRY`].
#[inline]
pub(crate) fn expiry_after(ttl: Duration) -> u64 {
  if ttl.is_zero() {
    return NO_EXPIRY;
  }
  let ttl_nanos = u64::try_from(ttl.as_nanos()).unwrap_or(u64::MAX);
  now_nanos().saturating_add(ttl_nanos)
}
