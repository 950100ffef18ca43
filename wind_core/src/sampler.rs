//! Periodic sampling thread.
//!
//! Spawns a thread that owns the `WindDigitizer` and the output sink, runs
//! one cycle per period, and pushes each cycle's diagnostics via a bounded
//! channel so the shell can read the latest on demand.
//!
//! Safety: Each `Sampler` spawns exactly one thread that is automatically
//! shut down when the `Sampler` is dropped, preventing thread leaks.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use wind_traits::{Clock, WindSink};

use crate::diagnostics::Diagnostics;
use crate::digitizer::WindDigitizer;

pub struct Sampler {
    rx: xch::Receiver<Diagnostics>,
    ticks: Arc<AtomicU64>,
    overruns: Arc<AtomicU64>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Run `digitizer` every `timing.period_ms`, publishing to `sink`,
    /// until dropped.
    pub fn spawn<C, S>(digitizer: WindDigitizer<C>, sink: S) -> Self
    where
        C: Clock + Send + Sync + 'static,
        S: WindSink + Send + 'static,
    {
        Self::spawn_with_limit(digitizer, sink, None)
    }

    /// Like `spawn`, but the thread stops by itself after `max_cycles` cycles.
    /// `Some(0)` starts a thread that runs no cycle.
    pub fn spawn_with_limit<C, S>(
        mut digitizer: WindDigitizer<C>,
        mut sink: S,
        max_cycles: Option<u64>,
    ) -> Self
    where
        C: Clock + Send + Sync + 'static,
        S: WindSink + Send + 'static,
    {
        let (tx, rx) = xch::bounded(1);
        // Kept by the thread to evict a diagnostic nobody collected.
        let evict = rx.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let ticks = Arc::new(AtomicU64::new(0));
        let ticks_clone = ticks.clone();
        let overruns = Arc::new(AtomicU64::new(0));
        let overruns_clone = overruns.clone();
        let period = digitizer.timing().period();

        let join_handle = std::thread::spawn(move || {
            let capture = digitizer.capture().clone();
            let clock = capture.clock();
            tracing::info!(period_ms = period.as_millis() as u64, "sampler started");
            let limit_reached = |done: u64| max_cycles.is_some_and(|max| done >= max);
            let mut deadline = clock.now();
            let mut done = 0;
            loop {
                // Immediate shutdown check (lock-free atomic)
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Sampler thread received shutdown signal");
                    break;
                }
                // Checked before the cycle so a limit of zero runs none.
                if limit_reached(done) {
                    tracing::debug!(cycles = done, "sampler reached its cycle limit");
                    break;
                }

                let diag = digitizer.step(&mut sink);
                done = ticks_clone.fetch_add(1, Ordering::Relaxed) + 1;
                if let Err(xch::TrySendError::Full(d)) = tx.try_send(diag) {
                    let _ = evict.try_recv();
                    let _ = tx.try_send(d);
                }
                if limit_reached(done) {
                    continue;
                }

                deadline += period;
                let now = clock.now();
                if now > deadline {
                    overruns_clone.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        late_us = now.saturating_duration_since(deadline).as_micros() as u64,
                        "sampling cycle overran its period"
                    );
                    deadline = now;
                    continue;
                }
                // Check shutdown before sleep to avoid unnecessary delay
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(deadline.saturating_duration_since(now));
            }
            tracing::info!(
                cycles = ticks_clone.load(Ordering::Relaxed),
                overruns = overruns_clone.load(Ordering::Relaxed),
                "sampler stopped"
            );
        });

        Self {
            rx,
            ticks,
            overruns,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Most recent cycle's diagnostics, if one arrived since the last call.
    pub fn latest(&self) -> Option<Diagnostics> {
        self.rx.try_iter().last()
    }

    /// Block up to `timeout` for the next cycle's diagnostics.
    pub fn wait_next(&self, timeout: std::time::Duration) -> Option<Diagnostics> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// True once the thread has stopped (cycle limit reached).
    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_none_or(std::thread::JoinHandle::is_finished)
    }

    /// Completed cycles.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Cycles that finished after their deadline.
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        // Signal shutdown immediately (atomic store is very fast, <10ns)
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits at its next shutdown check: at most one period.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Sampler thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "Sampler thread panicked during shutdown");
                }
            }
        }
    }
}
