use crate::entry::StoreEntry;
use crate::metrics::Metrics;
use crate::shared::StoreMap;
use crate::time;

use std::any::Any;
use std::hash::BuildHasher;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

const JANITOR_THREAD_NAME: &str = "fibre-store-janitor";

/// A stop flag the janitor can sleep on. Setting it wakes the janitor
/// immediately instead of at its next tick.
#[derive(Debug, Default)]
struct StopSignal {
  stopped: Mutex<bool>,
  condvar: Condvar,
}

impl StopSignal {
  /// Blocks until `deadline` passes or a stop is requested. A `None`
  /// deadline (an interval too large to represent) waits for the stop alone.
  /// Returns `true` only if the deadline was reached without a stop.
  fn wait_until(&self, deadline: Option<Instant>) -> bool {
    let mut stopped = self.stopped.lock();
    while !*stopped {
      match deadline {
        Some(deadline) => {
          if self.condvar.wait_until(&mut stopped, deadline).timed_out() {
            return !*stopped;
          }
        }
        None => self.condvar.wait(&mut stopped),
      }
    }
    false
  }

  fn stop(&self) {
    *self.stopped.lock() = true;
    self.condvar.notify_all();
  }
}

/// The background thread that runs one maintenance tick per interval.
#[derive(Debug)]
pub(crate) struct Janitor {
  handle: JoinHandle<()>,
  signal: Arc<StopSignal>,
  tick_interval: Duration,
}

impl Janitor {
  /// Spawns a new janitor thread that calls `tick` once every `tick_interval`,
  /// the first call happening one interval from now.
  ///
  /// A panic inside `tick` is caught and logged, and ends the thread.
  pub(crate) fn spawn<F>(tick_interval: Duration, mut tick: F) -> io::Result<Self>
  where
    F: FnMut() + Send + 'static,
  {
    let signal = Arc::new(StopSignal::default());
    let signal_clone = signal.clone();
    // Logs from the janitor go to whichever subscriber was current for the
    // thread that started it.
    let dispatch = tracing::dispatcher::get_default(|current| current.clone());

    let handle = thread::Builder::new()
      .name(JANITOR_THREAD_NAME.to_string())
      .spawn(move || tracing::dispatcher::with_default(&dispatch, || {
        let mut deadline = Instant::now().checked_add(tick_interval);

        while signal_clone.wait_until(deadline) {
          if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| tick())) {
            tracing::error!(
              panic = panic_message(payload.as_ref()),
              "store janitor tick panicked, cleanup stopped"
            );
            return;
          }

          // Missed ticks are dropped rather than fired back to back.
          let now = Instant::now();
          deadline = match deadline.and_then(|d| d.checked_add(tick_interval)) {
            Some(next) if next > now => Some(next),
            _ => now.checked_add(tick_interval),
          };
        }

        tracing::debug!("store janitor exited");
      }))?;

    Ok(Self {
      handle,
      signal,
      tick_interval,
    })
  }

  #[inline]
  pub(crate) fn tick_interval(&self) -> Duration {
    self.tick_interval
  }

  /// Returns `true` once the thread has exited, either after `stop` or
  /// because a tick panicked.
  #[inline]
  pub(crate) fn is_finished(&self) -> bool {
    self.handle.is_finished()
  }

  /// Signals the janitor thread to stop and waits for it to exit.
  ///
  /// A sweep in progress is allowed to finish first; the thread never exits
  /// halfway through one.
  pub(crate) fn stop(self) {
    self.signal.stop();

    // A value dropped by a sweep may own the last store handle, in which case
    // we are running on the janitor thread itself and must not join it.
    if self.handle.thread().id() == thread::current().id() {
      return;
    }

    if self.handle.join().is_err() {
      tracing::warn!("store janitor thread terminated abnormally");
    }
  }
}

/// Removes every entry whose expiry is at or before a single timestamp taken
/// at the start of the sweep. Returns the number of entries removed.
///
/// Removed values are dropped only after the write lock is released, so a
/// value whose `Drop` reads the store cannot deadlock the sweep.
pub(crate) fn remove_expired<V, H>(map: &StoreMap<V, H>, metrics: &Metrics) -> usize
where
  H: BuildHasher,
{
  let now = time::now_nanos();

  let victims: Vec<StoreEntry<V>> = {
    let mut guard = map.write();
    let due: Vec<String> = guard
      .iter()
      .filter(|(_, entry)| entry.is_due_at(now))
      .map(|(key, _)| key.clone())
      .collect();
    due.iter().filter_map(|key| guard.remove(key)).collect()
  };
  let removed = victims.len();

  metrics.sweeps.fetch_add(1, Ordering::Relaxed);
  if removed > 0 {
    metrics
      .evicted_by_ttl
      .fetch_add(removed as u64, Ordering::Relaxed);
  }
  tracing::trace!(removed, "swept expired entries");

  drop(victims);
  removed
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
  if let Some(message) = payload.downcast_ref::<&'static str>() {
    message
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.as_str()
  } else {
    "<non-string panic payload>"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::collections::HashMap;
  use std::sync::atomic::AtomicUsize;

  use parking_lot::RwLock;

  const TICK: Duration = Duration::from_millis(10);

  #[test]
  fn ticks_repeatedly_until_stopped() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticks_clone = ticks.clone();

    let janitor = Janitor::spawn(TICK, move || {
      ticks_clone.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    thread::sleep(TICK * 15);
    janitor.stop();

    let after_stop = ticks.load(Ordering::SeqCst);
    assert!(after_stop >= 3, "expected several ticks, got {after_stop}");

    thread::sleep(TICK * 5);
    assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
  }

  #[test]
  fn stop_does_not_wait_for_the_next_tick() {
    let janitor = Janitor::spawn(Duration::from_secs(3600), || {}).unwrap();

    let started = Instant::now();
    janitor.stop();
    assert!(started.elapsed() < Duration::from_secs(1));
  }

  #[test]
  fn unrepresentable_interval_waits_for_stop() {
    let janitor = Janitor::spawn(Duration::MAX, || panic!("must never tick")).unwrap();

    thread::sleep(TICK * 3);
    assert!(!janitor.is_finished());
    janitor.stop();
  }

  #[test]
  fn panicking_tick_ends_the_thread_without_propagating() {
    let janitor = Janitor::spawn(TICK, || panic!("boom")).unwrap();

    thread::sleep(TICK * 10);
    assert!(janitor.is_finished());

    // Joining a thread that caught its own panic is clean.
    janitor.stop();
  }

  /// Collects formatted log output in memory.
  #[derive(Clone, Default)]
  struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

  impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      self.0.lock().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  impl CapturedLogs {
    fn contents(&self) -> String {
      String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
  }

  #[test]
  fn panicking_tick_is_logged_as_an_error() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(move || writer.clone())
      .with_ansi(false)
      .with_max_level(tracing::Level::DEBUG)
      .finish();

    tracing::subscriber::with_default(subscriber, || {
      let janitor = Janitor::spawn(TICK, || panic!("sweep exploded")).unwrap();
      thread::sleep(TICK * 10);
      assert!(janitor.is_finished());
      janitor.stop();
    });

    let output = logs.contents();
    assert!(output.contains("ERROR"), "no error line in: {output}");
    assert!(output.contains("store janitor tick panicked"), "{output}");
    assert!(output.contains("sweep exploded"), "{output}");
  }

  #[test]
  fn panic_message_handles_both_payload_kinds() {
    let static_payload: Box<dyn Any + Send> = Box::new("static");
    let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
    let other_payload: Box<dyn Any + Send> = Box::new(7_u8);

    assert_eq!(panic_message(static_payload.as_ref()), "static");
    assert_eq!(panic_message(owned_payload.as_ref()), "owned");
    assert_eq!(panic_message(other_payload.as_ref()), "<non-string panic payload>");
  }

  #[test]
  fn remove_expired_only_takes_due_entries() {
    let map: StoreMap<&str, ahash::RandomState> =
      RwLock::new(HashMap::with_hasher(ahash::RandomState::new()));
    let metrics = Metrics::new();

    {
      let mut guard = map.write();
      guard.insert("forever".into(), StoreEntry::new(Arc::new("a"), Duration::ZERO));
      guard.insert("short".into(), StoreEntry::new(Arc::new("b"), Duration::from_millis(1)));
      guard.insert("long".into(), StoreEntry::new(Arc::new("c"), Duration::from_secs(60)));
    }

    thread::sleep(Duration::from_millis(5));
    assert_eq!(remove_expired(&map, &metrics), 1);

    let guard = map.read();
    assert!(guard.contains_key("forever"));
    assert!(guard.contains_key("long"));
    assert!(!guard.contains_key("short"));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.sweeps, 1);
    assert_eq!(snapshot.evicted_by_ttl, 1);
  }
}
