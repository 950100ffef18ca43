//! Direction calculator: vane timing to a gated, smoothed apparent wind angle.
//!
//! The raw angle is the vane edge's fraction of one anemometer revolution.
//! Smoothing is a first-order exponential filter applied along the shorter
//! way round the circle.

use crate::bands::direction_deviation_ok;
use crate::config::DirectionBaseline;

/// Diagnostic raw-angle value for an indeterminate sample.
pub const INDETERMINATE_DEG: i32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionOutcome {
    /// Not evaluated this cycle (speed was zero or rejected).
    Skipped,
    /// Vane interval not shorter than the revolution; no angle.
    Indeterminate,
    Accepted {
        raw_deg: i32,
        filtered_deg: i32,
    },
    Rejected {
        raw_deg: i32,
        deviation_deg: i32,
    },
}

/// Raw angle in [0, 360), or `None` when `direction_interval_us >= speed_interval_us`.
///
/// The sensor turns opposite to the published convention, so the fraction
/// is mirrored after the offset is removed.
pub fn raw_angle_deg(
    direction_interval_us: u64,
    speed_interval_us: u64,
    offset_deg: i32,
) -> Option<i32> {
    if direction_interval_us >= speed_interval_us {
        return None;
    }
    let fraction_deg =
        (u128::from(direction_interval_us) * 360 / u128::from(speed_interval_us)) as i64;
    let adjusted = (fraction_deg - i64::from(offset_deg)).rem_euclid(360);
    Some(((360 - adjusted) % 360) as i32)
}

/// Signed delta from `from_deg` to `to_deg` along the shorter path, in [-180, 180].
#[inline]
pub fn shortest_delta_deg(from_deg: i32, to_deg: i32) -> i32 {
    let delta = to_deg - from_deg;
    if delta < -180 {
        delta + 360
    } else if delta > 180 {
        delta - 360
    } else {
        delta
    }
}

/// One filter step towards `raw_deg`. Result in [0, 360).
///
/// `gain` is not range-checked; a gain outside [0, 1] overshoots but the
/// result stays on the circle.
#[inline]
pub fn filter_step(filtered_deg: i32, raw_deg: i32, gain: f32) -> i32 {
    let delta = shortest_delta_deg(filtered_deg, raw_deg);
    // Saturating float-to-int cast; i64 keeps the sum from overflowing.
    let step = (gain * delta as f32).round() as i64;
    i64::from(filtered_deg).saturating_add(step).rem_euclid(360) as i32
}

/// Direction state carried across cycles, in whole degrees.
#[derive(Debug, Clone, Default)]
pub struct DirectionCalculator {
    previous_raw_deg: i32,
    filtered_deg: i32,
    // Last computed raw angle (or sentinel), for diagnostics only
    last_raw_deg: i32,
    baseline: DirectionBaseline,
}

impl DirectionCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline(baseline: DirectionBaseline) -> Self {
        Self {
            baseline,
            ..Self::default()
        }
    }

    /// Process one cycle. `speed_cmps` is the speed just accepted and picks
    /// the deviation band.
    pub fn update(
        &mut self,
        direction_interval_us: u64,
        speed_interval_us: u64,
        speed_cmps: i64,
        offset_deg: i32,
        filter_gain: f32,
    ) -> DirectionOutcome {
        let Some(raw) = raw_angle_deg(direction_interval_us, speed_interval_us, offset_deg) else {
            self.last_raw_deg = INDETERMINATE_DEG;
            tracing::debug!(
                direction_interval_us,
                speed_interval_us,
                "indeterminate direction sample"
            );
            return DirectionOutcome::Indeterminate;
        };
        self.last_raw_deg = raw;

        let deviation = raw - self.previous_raw_deg;
        if !direction_deviation_ok(speed_cmps, deviation) {
            tracing::debug!(
                raw_deg = raw,
                deviation_deg = deviation,
                speed_cmps,
                "direction sample rejected"
            );
            if self.baseline == DirectionBaseline::Computed {
                self.previous_raw_deg = raw;
            }
            return DirectionOutcome::Rejected {
                raw_deg: raw,
                deviation_deg: deviation,
            };
        }

        self.filtered_deg = filter_step(self.filtered_deg, raw, filter_gain);
        self.previous_raw_deg = raw;
        DirectionOutcome::Accepted {
            raw_deg: raw,
            filtered_deg: self.filtered_deg,
        }
    }

    /// Published (filtered) direction in degrees.
    #[inline]
    pub fn filtered_deg(&self) -> i32 {
        self.filtered_deg
    }

    /// The deviation baseline for the next sample.
    #[inline]
    pub fn previous_raw_deg(&self) -> i32 {
        self.previous_raw_deg
    }

    /// Last computed raw angle, or `INDETERMINATE_DEG`.
    #[inline]
    pub fn last_raw_deg(&self) -> i32 {
        self.last_raw_deg
    }
}
