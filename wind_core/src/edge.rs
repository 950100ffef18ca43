//! Edge capture for the speed and direction inputs.
//!
//! The two `on_*_edge` handlers are called from the host's falling-edge
//! interrupt facility. They touch only the four shared timing fields, take
//! the critical section for O(1) work, and never allocate. The periodic side
//! reads all four fields at once through `snapshot()`.
use std::cell::Cell;
use std::time::Instant;

use wind_traits::{Clock, MonotonicClock, PulseLine};

/// Timing fields shared between the edge handlers and the periodic cycle.
///
/// All times are microseconds since the capture's epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeSnapshot {
    /// Time of the most recent accepted speed edge.
    pub speed_pulse_at_us: u64,
    /// Time of the most recent accepted direction edge.
    pub direction_pulse_at_us: u64,
    /// Time between the two most recent speed edges.
    pub speed_interval_us: u64,
    /// Offset of the direction edge into the revolution that the last speed
    /// edge closed.
    pub direction_interval_us: u64,
}

impl EdgeSnapshot {
    /// Zero the speed interval when the last speed edge is older than
    /// `pulse_timeout_us`.
    #[inline]
    pub fn with_staleness_guard(mut self, now_us: u64, pulse_timeout_us: u64) -> Self {
        if self.is_stale(now_us, pulse_timeout_us) {
            self.speed_interval_us = 0;
        }
        self
    }

    #[inline]
    pub fn is_stale(&self, now_us: u64, pulse_timeout_us: u64) -> bool {
        now_us.saturating_sub(self.speed_pulse_at_us) > pulse_timeout_us
    }
}

/// What an edge handler did with one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEvent {
    /// Edge recorded.
    Accepted,
    /// Line no longer reads low; stale or noise-triggered interrupt.
    NotLow,
    /// Inside the debounce window of the previous accepted edge.
    Bounced,
}

/// Interrupt-side state container for both pulse channels.
pub struct EdgeCapture<C: Clock = MonotonicClock> {
    shared: critical_section::Mutex<Cell<EdgeSnapshot>>,
    clock: C,
    epoch: Instant,
    debounce_us: u64,
}

impl<C: Clock> core::fmt::Debug for EdgeCapture<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EdgeCapture")
            .field("debounce_us", &self.debounce_us)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl<C: Clock> EdgeCapture<C> {
    /// Create a capture whose time base starts now.
    pub fn new(clock: C, debounce_us: u64) -> Self {
        let epoch = clock.now();
        Self {
            shared: critical_section::Mutex::new(Cell::new(EdgeSnapshot::default())),
            clock,
            epoch,
            debounce_us,
        }
    }

    /// Microseconds since this capture's epoch.
    #[inline]
    pub fn now_us(&self) -> u64 {
        self.clock.us_since(self.epoch)
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn debounce_us(&self) -> u64 {
        self.debounce_us
    }

    /// Falling edge on the anemometer line.
    ///
    /// Before the previous speed edge time is overwritten, the direction
    /// interval is updated if the last direction edge fell at or after it.
    pub fn on_speed_edge(&self, line: &impl PulseLine) -> EdgeEvent {
        if !line.is_low() {
            return EdgeEvent::NotLow;
        }
        let now = self.now_us();
        critical_section::with(|cs| {
            let cell = self.shared.borrow(cs);
            let mut s = cell.get();
            let elapsed = now.saturating_sub(s.speed_pulse_at_us);
            if elapsed < self.debounce_us {
                return EdgeEvent::Bounced;
            }
            s.speed_interval_us = elapsed;
            if s.direction_pulse_at_us >= s.speed_pulse_at_us {
                s.direction_interval_us = s.direction_pulse_at_us - s.speed_pulse_at_us;
            }
            s.speed_pulse_at_us = now;
            cell.set(s);
            EdgeEvent::Accepted
        })
    }

    /// Falling edge on the wind-vane line.
    pub fn on_direction_edge(&self, line: &impl PulseLine) -> EdgeEvent {
        if !line.is_low() {
            return EdgeEvent::NotLow;
        }
        let now = self.now_us();
        critical_section::with(|cs| {
            let cell = self.shared.borrow(cs);
            let mut s = cell.get();
            if now.saturating_sub(s.direction_pulse_at_us) < self.debounce_us {
                return EdgeEvent::Bounced;
            }
            s.direction_pulse_at_us = now;
            cell.set(s);
            EdgeEvent::Accepted
        })
    }

    /// Consistent copy of all four timing fields.
    #[inline]
    pub fn snapshot(&self) -> EdgeSnapshot {
        critical_section::with(|cs| self.shared.borrow(cs).get())
    }
}
