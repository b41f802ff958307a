use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the store.
/// All fields are atomic so they can be bumped under a read lock.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Lookups ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) expired_reads: CachePadded<AtomicU64>,

  // --- Writes ---
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) deletions: CachePadded<AtomicU64>,
  pub(crate) resets: CachePadded<AtomicU64>,

  // --- Active Expiration ---
  pub(crate) evicted_by_ttl: CachePadded<AtomicU64>,
  pub(crate) sweeps: CachePadded<AtomicU64>,

  created_at: Instant,
}

// Manual implementation of Default to handle the non-default `Instant`.
impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      expired_reads: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      deletions: CachePadded::new(AtomicU64::new(0)),
      resets: CachePadded::new(AtomicU64::new(0)),
      evicted_by_ttl: CachePadded::new(AtomicU64::new(0)),
      sweeps: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let expired_reads = self.expired_reads.load(Ordering::Relaxed);
    let total_lookups = hits + misses + expired_reads;

    MetricsSnapshot {
      hits,
      misses,
      expired_reads,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      deletions: self.deletions.load(Ordering::Relaxed),
      resets: self.resets.load(Ordering::Relaxed),
      evicted_by_ttl: self.evicted_by_ttl.load(Ordering::Relaxed),
      sweeps: self.sweeps.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of the store's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// The number of `get` calls that returned a value.
  pub hits: u64,
  /// The number of `get` calls that found no entry.
  pub misses: u64,
  /// The number of `get` calls that found an expired, not yet swept entry.
  pub expired_reads: u64,
  /// hits / (hits + misses + expired_reads).
  pub hit_ratio: f64,
  /// The number of successful `set` calls, including overwrites.
  pub inserts: u64,
  /// The number of `delete` calls that actually removed an entry.
  pub deletions: u64,
  /// The number of `reset` calls.
  pub resets: u64,
  /// The number of entries removed by sweeps.
  pub evicted_by_ttl: u64,
  /// The number of sweeps performed, by the janitor or `purge_expired`.
  pub sweeps: u64,
  /// The number of seconds the store has existed.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("expired_reads", &self.expired_reads)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("inserts", &self.inserts)
      .field("deletions", &self.deletions)
      .field("resets", &self.resets)
      .field("evicted_by_ttl", &self.evicted_by_ttl)
      .field("sweeps", &self.sweeps)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
