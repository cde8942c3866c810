use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// A value that trails its source by a fixed quiet period.
///
/// Every [`set`](Debouncer::set) aborts the timer scheduled by the previous one and starts a new
/// one, so only a value that survives `delay` without being replaced is ever emitted. Emissions are
/// collected with [`poll`](Debouncer::poll) from the owner's event loop.
///
/// Timer tasks are tagged with a generation number: a timer that already fired but whose message
/// was not yet drained when a newer value arrived is dropped on `poll` instead of being emitted.
///
/// Must be used from within a tokio runtime.
pub struct Debouncer<T> {
  delay: Duration,
  value: T,
  generation: u64,
  pending: Option<JoinHandle<()>>,
  tx: mpsc::UnboundedSender<(u64, T)>,
  rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Clone + Send + 'static> Debouncer<T> {
  /// The emitted value starts out equal to `initial`, with nothing pending.
  pub fn new(initial: T, delay: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { delay, value: initial, generation: 0, pending: None, tx, rx }
  }

  /// The last emitted value.
  pub fn value(&self) -> &T {
    &self.value
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  /// Whether a timer is scheduled and has not been drained yet.
  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Schedule `value` for emission after the quiet period, replacing any pending one.
  pub fn set(&mut self, value: T) {
    self.cancel();
    self.generation = self.generation.wrapping_add(1);

    let generation = self.generation;
    let delay = self.delay;
    let tx = self.tx.clone();
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let _ = tx.send((generation, value));
    }));
  }

  /// Drop the pending emission, if any. The emitted value is left untouched.
  pub fn cancel(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
    // A timer that fired before the abort may already have queued its value.
    while self.rx.try_recv().is_ok() {}
  }

  /// Drain fired timers. Returns the new value when one was emitted since the last call.
  pub fn poll(&mut self) -> Option<&T> {
    let mut emitted = false;
    while let Ok((generation, value)) = self.rx.try_recv() {
      if generation == self.generation {
        self.value = value;
        self.pending = None;
        emitted = true;
      } else {
        trace!(generation, current = self.generation, "debounce: dropping superseded value");
      }
    }
    emitted.then_some(&self.value)
  }
}

impl<T> Drop for Debouncer<T> {
  fn drop(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::time::sleep;

  const DELAY: Duration = Duration::from_millis(300);

  #[tokio::test(start_paused = true)]
  async fn initial_value_is_emitted_immediately() {
    let mut d = Debouncer::new("start".to_string(), DELAY);
    assert_eq!(d.value(), "start");
    assert!(!d.is_pending());
    assert!(d.poll().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn emits_after_quiet_period() {
    let mut d = Debouncer::new(String::new(), DELAY);
    d.set("rock".to_string());
    assert!(d.is_pending());

    sleep(Duration::from_millis(299)).await;
    assert!(d.poll().is_none());
    assert_eq!(d.value(), "");

    sleep(Duration::from_millis(2)).await;
    assert_eq!(d.poll().map(String::as_str), Some("rock"));
    assert!(!d.is_pending());
    assert!(d.poll().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn superseded_value_is_never_emitted() {
    let mut d = Debouncer::new(String::new(), DELAY);
    d.set("r".to_string());
    sleep(Duration::from_millis(100)).await;
    d.set("ro".to_string());

    // "r" would have fired at 300ms had it not been replaced.
    sleep(Duration::from_millis(250)).await;
    assert!(d.poll().is_none());
    assert_eq!(d.value(), "");

    sleep(Duration::from_millis(60)).await;
    assert_eq!(d.poll().map(String::as_str), Some("ro"));
  }

  #[tokio::test(start_paused = true)]
  async fn fired_but_undrained_value_loses_to_newer_set() {
    let mut d = Debouncer::new(0u32, DELAY);
    d.set(1);
    sleep(Duration::from_millis(400)).await;
    // The first timer has fired but nobody polled yet.
    d.set(2);
    assert!(d.poll().is_none());
    assert_eq!(*d.value(), 0);

    sleep(DELAY + Duration::from_millis(1)).await;
    assert_eq!(d.poll().copied(), Some(2));
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_discards_pending_value() {
    let mut d = Debouncer::new(0u32, DELAY);
    d.set(7);
    d.cancel();
    assert!(!d.is_pending());

    sleep(DELAY * 2).await;
    assert!(d.poll().is_none());
    assert_eq!(*d.value(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn drop_aborts_pending_timer() {
    let value = std::sync::Arc::new(7u32);
    let mut d = Debouncer::new(std::sync::Arc::new(0u32), DELAY);
    d.set(std::sync::Arc::clone(&value));
    assert_eq!(std::sync::Arc::strong_count(&value), 2);

    drop(d);
    for _ in 0..5 {
      tokio::task::yield_now().await;
    }
    // The aborted timer task released its copy without waiting out the delay.
    assert_eq!(std::sync::Arc::strong_count(&value), 1);

    sleep(DELAY * 2).await;
    assert_eq!(std::sync::Arc::strong_count(&value), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn steady_typing_only_emits_last_value() {
    let mut d = Debouncer::new(String::new(), DELAY);
    let mut emitted = Vec::new();
    for text in ["a", "al", "alp", "alph", "alpha"] {
      d.set(text.to_string());
      sleep(Duration::from_millis(120)).await;
      if let Some(v) = d.poll() {
        emitted.push(v.clone());
      }
    }
    sleep(DELAY).await;
    if let Some(v) = d.poll() {
      emitted.push(v.clone());
    }
    assert_eq!(emitted, vec!["alpha".to_string()]);
  }
}
