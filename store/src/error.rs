use thiserror::Error;

/// Errors returned by store operations.
///
/// Every kind is returned straight to the caller; none is retried or logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
  /// `set` was called with an empty key.
  #[error("key cannot be empty")]
  EmptyKey,
  /// `set` was called with a time-to-live below zero.
  #[error("time-to-live cannot be negative")]
  NegativeTtl,
  /// No entry exists for the key: it was never set, or it was deleted,
  /// reset or swept.
  #[error("key not found")]
  KeyNotFound,
  /// An entry exists for the key but its time-to-live has lapsed and it has
  /// not been swept yet.
  #[error("key has expired")]
  KeyExpired,
}

/// Errors that can occur when building a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// A cleanup interval of zero was configured. Omit the interval to build a
  /// store without a janitor.
  #[error("cleanup interval cannot be zero")]
  ZeroCleanupInterval,
}

/// A specialized `Result` type for store operations.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
