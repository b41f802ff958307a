use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use fibre_store::{Ttl, TtlStore};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const NUM_ITEMS: usize = 10_000;

fn keys() -> Vec<String> {
  (0..NUM_ITEMS).map(|i| format!("benchmarkKey{i}")).collect()
}

fn populated_store(keys: &[String], ttl: Ttl) -> TtlStore<&'static str> {
  let store = TtlStore::new();
  for key in keys {
    store.set(key.as_str(), "benchmarkValue", ttl).unwrap();
  }
  store
}

fn bench_set(c: &mut Criterion) {
  let keys = keys();
  let mut group = c.benchmark_group("set");
  group.throughput(Throughput::Elements(NUM_ITEMS as u64));

  group.bench_function("no_ttl", |b| {
    let store = TtlStore::new();
    b.iter(|| {
      for key in &keys {
        store.set(key.as_str(), black_box("benchmarkValue"), Ttl::NONE).unwrap();
      }
    })
  });

  group.bench_function("with_ttl", |b| {
    let store = TtlStore::new();
    b.iter(|| {
      for key in &keys {
        store
          .set(key.as_str(), black_box("benchmarkValue"), Duration::from_secs(2))
          .unwrap();
      }
    })
  });
  group.finish();
}

fn bench_get(c: &mut Criterion) {
  let keys = keys();
  let store = populated_store(&keys, Ttl::NONE);
  let mut group = c.benchmark_group("get");
  group.throughput(Throughput::Elements(NUM_ITEMS as u64));

  group.bench_function("hit", |b| {
    b.iter(|| {
      for key in &keys {
        black_box(store.get(key).unwrap());
      }
    })
  });

  group.bench_function("miss", |b| {
    b.iter(|| {
      for key in &keys {
        let _ = black_box(store.get(&key[1..]));
      }
    })
  });

  // Read-heavy contention: several threads hammering the shared read lock.
  group.bench_function("hit_contended_4_threads", |b| {
    let keys = Arc::new(keys.clone());
    b.iter_custom(|iters| {
      let barrier = Arc::new(Barrier::new(4));
      let handles: Vec<_> = (0..4)
        .map(|_| {
          let store = store.clone();
          let keys = keys.clone();
          let barrier = barrier.clone();
          thread::spawn(move || {
            barrier.wait();
            let start = Instant::now();
            for _ in 0..iters {
              for key in keys.iter() {
                black_box(store.get(key).unwrap());
              }
            }
            start.elapsed()
          })
        })
        .collect();
      handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .max()
        .unwrap_or_default()
    })
  });
  group.finish();
}

fn bench_delete(c: &mut Criterion) {
  let keys = keys();
  let mut group = c.benchmark_group("delete");
  group.throughput(Throughput::Elements(NUM_ITEMS as u64));

  group.bench_function("present", |b| {
    b.iter_batched(
      || populated_store(&keys, Ttl::from(Duration::from_secs(2))),
      |store| {
        for key in &keys {
          store.delete(key);
        }
        store
      },
      BatchSize::LargeInput,
    )
  });
  group.finish();
}

fn bench_reset(c: &mut Criterion) {
  let keys = keys();

  c.bench_function("reset", |b| {
    b.iter_batched(
      || populated_store(&keys, Ttl::NONE),
      |store| {
        store.reset();
        store
      },
      BatchSize::LargeInput,
    )
  });
}

fn bench_purge_expired(c: &mut Criterion) {
  let keys = keys();

  c.bench_function("purge_expired_all_due", |b| {
    b.iter_batched(
      || {
        let store = populated_store(&keys, Ttl::from_nanos(1));
        thread::sleep(Duration::from_millis(1));
        store
      },
      |store| {
        black_box(store.purge_expired());
        store
      },
      BatchSize::LargeInput,
    )
  });
}

criterion_group!(
  benches,
  bench_set,
  bench_get,
  bench_delete,
  bench_reset,
  bench_purge_expired
);
criterion_main!(benches);
