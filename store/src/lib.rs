//! A thread-safe, in-process key-value store with per-entry time-to-live.
//!
//! # Features
//! - **Read-Heavy Concurrency**: A single `parking_lot` reader-writer lock guards
//!   the map. Reads only ever take the shared side.
//! - **Lazy Expiration**: Reads report an entry whose TTL has lapsed as
//!   [`StoreError::KeyExpired`] without touching the map.
//! - **Active Expiration**: An optional janitor thread sweeps expired entries
//!   out on a fixed interval, started and stopped per store.
//! - **Opaque Values**: Values are held in an `Arc<V>` and handed back as the
//!   same `Arc`, so `V` never needs to be `Clone`.
//!
//! # Example
//!
//! ```rust
//! use fibre_store::{StoreError, TtlStore};
//! use std::time::Duration;
//!
//! let store = TtlStore::new();
//! store.set("a", "1", Duration::ZERO).unwrap();
//! assert_eq!(*store.get("a").unwrap(), "1");
//!
//! store.delete("a");
//! assert_eq!(store.get("a").unwrap_err(), StoreError::KeyNotFound);
//! ```

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handles;
pub mod metrics;
pub mod ttl;

// Internal, crate-only modules
mod entry;
mod shared;
mod task;
mod time;

// Re-export the primary user-facing types for convenience
pub use builder::StoreBuilder;
pub use error::{BuildError, Result, StoreError};
pub use handles::TtlStore;
pub use metrics::MetricsSnapshot;
pub use ttl::Ttl;
