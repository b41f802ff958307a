//! The time-to-live accepted by [`TtlStore::set`](crate::TtlStore::set).
//!
//! `std::time::Duration` cannot be negative, but callers that compute a TTL
//! from signed arithmetic (or carry a `chrono::TimeDelta`) can. `Ttl` keeps
//! the sign so the store can reject a negative value instead of silently
//! clamping it.

use crate::error::{Result, StoreError};

use std::time::Duration;

use chrono::TimeDelta;

const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SEC: i128 = 1_000_000_000;

/// A signed time-to-live. Zero means the entry never expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl {
  nanos: i128,
}

impl Ttl {
  /// The entry never expires.
  pub const NONE: Ttl = Ttl { nanos: 0 };

  pub const fn from_nanos(nanos: i128) -> Self {
    Self { nanos }
  }

  pub const fn from_millis(millis: i64) -> Self {
    Self {
      nanos: millis as i128 * NANOS_PER_MILLI,
    }
  }

  pub const fn from_secs(secs: i64) -> Self {
    Self {
      nanos: secs as i128 * NANOS_PER_SEC,
    }
  }

  /// Returns `true` if this TTL means "never expires".
  #[inline]
  pub const fn is_none(&self) -> bool {
    self.nanos == 0
  }

  #[inline]
  pub const fn is_negative(&self) -> bool {
    self.nanos < 0
  }

  /// Validates the TTL and converts it into an unsigned `Duration`.
  ///
  /// Values beyond `Duration::MAX` saturate.
  pub(crate) fn to_duration(self) -> Result<Duration> {
    if self.is_negative() {
      return Err(StoreError::NegativeTtl);
    }
    let secs = u64::try_from(self.nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    let subsec = (self.nanos % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, subsec))
  }
}

impl From<Duration> for Ttl {
  fn from(duration: Duration) -> Self {
    // Duration::MAX is ~1.8e28ns, well inside i128.
    Self {
      nanos: duration.as_nanos() as i128,
    }
  }
}

impl From<TimeDelta> for Ttl {
  fn from(delta: TimeDelta) -> Self {
    let nanos = delta
      .num_nanoseconds()
      .map_or_else(|| i128::from(delta.num_milliseconds()) * NANOS_PER_MILLI, i128::from);
    Self { nanos }
  }
}
