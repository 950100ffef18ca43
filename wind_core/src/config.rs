//! Runtime configuration for the digitizer.
//!
//! `TimingCfg` carries the fixed timing constants; `Tuning` is the live,
//! externally owned handle for the two parameters that may change while the
//! sampler runs. Both are separate from the TOML schema in `wind_config`.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

/// Timing constants for edge capture and the periodic cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingCfg {
    /// Minimum time between accepted edges on one channel (µs).
    pub debounce_us: u64,
    /// No speed edge for longer than this means "no wind" (µs).
    pub pulse_timeout_us: u64,
    /// Sampling period (ms).
    pub period_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            debounce_us: wind_config::DEFAULT_DEBOUNCE_US,
            pulse_timeout_us: wind_config::DEFAULT_PULSE_TIMEOUT_US,
            period_ms: wind_config::DEFAULT_PERIOD_MS,
        }
    }
}

impl TimingCfg {
    #[inline]
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.period_ms)
    }
}

/// Which raw angle the next direction sample is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionBaseline {
    /// Last accepted raw angle; a rejected sample leaves the baseline alone.
    #[default]
    Accepted,
    /// Last computed raw angle, accepted or not (mirrors the speed baseline).
    Computed,
}

#[derive(Debug)]
struct TuningInner {
    filter_gain_bits: AtomicU32,
    direction_offset_deg: AtomicI32,
}

/// Shared handle to the live filter gain and direction offset.
///
/// Clones share state: the shell keeps one clone to adjust values, the
/// digitizer reads its clone once per cycle. Values are not range-checked
/// here.
#[derive(Debug, Clone)]
pub struct Tuning {
    inner: Arc<TuningInner>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new(wind_config::DEFAULT_FILTER_GAIN, 0)
    }
}

impl Tuning {
    pub fn new(filter_gain: f32, direction_offset_deg: i32) -> Self {
        Self {
            inner: Arc::new(TuningInner {
                filter_gain_bits: AtomicU32::new(filter_gain.to_bits()),
                direction_offset_deg: AtomicI32::new(direction_offset_deg),
            }),
        }
    }

    #[inline]
    pub fn filter_gain(&self) -> f32 {
        f32::from_bits(self.inner.filter_gain_bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_filter_gain(&self, gain: f32) {
        self.inner
            .filter_gain_bits
            .store(gain.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn direction_offset_deg(&self) -> i32 {
        self.inner.direction_offset_deg.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_direction_offset_deg(&self, deg: i32) {
        self.inner.direction_offset_deg.store(deg, Ordering::Relaxed);
    }
}
