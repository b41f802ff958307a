use fibre_store::{StoreBuilder, StoreError, Ttl, TtlStore};
use std::thread;
use std::time::Duration;

use chrono::TimeDelta;
use tracing_subscriber::EnvFilter;

fn main() {
  // RUST_LOG=fibre_store=debug shows the janitor starting and stopping.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // A store whose janitor sweeps expired entries every 100ms.
  let store: TtlStore<String> = StoreBuilder::new()
    .cleanup_interval(Duration::from_millis(100))
    .build()
    .expect("Failed to build store");

  store.set("a", "1".to_string(), Ttl::NONE).unwrap();
  println!("get(a) -> {:?}", store.get("a"));

  match store.set("b", "x".to_string(), TimeDelta::seconds(-5)) {
    Err(StoreError::NegativeTtl) => println!("set(b, ttl = -5s) -> rejected, negative TTL"),
    other => println!("set(b) -> unexpected {other:?}"),
  }

  store
    .set("c", "y".to_string(), Duration::from_millis(150))
    .unwrap();
  println!("get(c) -> {:?}", store.get("c"));

  // Without the janitor, this would read as expired.
  thread::sleep(Duration::from_millis(400));
  println!("get(c) after 400ms -> {:?}", store.get("c"));

  store.stop_cleanup();

  // Now expiry is only ever lazy.
  store
    .set("d", "z".to_string(), Duration::from_millis(50))
    .unwrap();
  thread::sleep(Duration::from_millis(100));
  println!("get(d) with cleanup stopped -> {:?}", store.get("d"));
  println!("purge_expired() removed {}", store.purge_expired());

  println!("\nStore metrics: {:#?}", store.metrics());
}
