//! Cancellable-handle scheduler for analysis runs.
//!
//! Every trigger aborts the pending run before scheduling its own, so at most
//! one run is ever pending. Triggers that arrive within `interval` of the
//! last run are delayed by `interval`; otherwise the run starts right away.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// What a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    Immediate,
    Delayed(Duration),
}

#[derive(Debug)]
pub struct Debouncer {
    interval: Duration,
    last_run: Option<Instant>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: None,
        }
    }

    /// Cancel any pending run and schedule `task`.
    ///
    /// The task is expected to call [`Debouncer::mark_run`] when it starts.
    pub fn schedule<F>(&mut self, runtime: &Handle, now: Instant, task: F) -> Scheduled
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let decision = match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                Scheduled::Delayed(self.interval)
            }
            _ => Scheduled::Immediate,
        };

        let handle = match decision {
            Scheduled::Immediate => runtime.spawn(task),
            Scheduled::Delayed(delay) => runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                task.await;
            }),
        };
        self.pending = Some(handle);
        decision
    }

    /// Record that a run started at `now`.
    pub fn mark_run(&mut self, now: Instant) {
        self.last_run = Some(now);
    }

    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    /// Abort the pending run, if any. Returns whether one was still live.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_trigger_runs_immediately() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        let runs = Arc::new(AtomicUsize::new(0));
        let decision = debouncer.schedule(&Handle::current(), Instant::now(), counting(&runs));
        assert_eq!(decision, Scheduled::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_within_interval_runs_once() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.mark_run(Instant::now());
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let decision = debouncer.schedule(&Handle::current(), Instant::now(), counting(&runs));
            assert_eq!(decision, Scheduled::Delayed(Duration::from_secs(2)));
            tokio::time::advance(Duration::from_millis(300)).await;
        }
        assert!(debouncer.has_pending());
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_after_interval_is_immediate() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.mark_run(Instant::now());
        tokio::time::advance(Duration::from_secs(3)).await;
        let runs = Arc::new(AtomicUsize::new(0));
        let decision = debouncer.schedule(&Handle::current(), Instant::now(), counting(&runs));
        assert_eq!(decision, Scheduled::Immediate);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_run() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.mark_run(Instant::now());
        let runs = Arc::new(AtomicUsize::new(0));
        debouncer.schedule(&Handle::current(), Instant::now(), counting(&runs));
        assert!(debouncer.cancel());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel());
    }
}
