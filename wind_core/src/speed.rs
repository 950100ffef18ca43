//! Speed calculator: pulse interval to a gated speed output.

use crate::bands::speed_deviation_ok;
use crate::calibration::{rps_from_interval, speed_from_rps};

/// Result of one speed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedOutcome {
    /// Zero interval (stopped or stale): output forced to zero.
    NoWind,
    /// New speed published.
    Accepted { speed_cmps: i64 },
    /// Outside the band limit; previous output kept.
    Rejected {
        speed_cmps: i64,
        deviation_cmps: i64,
    },
}

impl SpeedOutcome {
    #[inline]
    pub fn accepted_speed(&self) -> Option<i64> {
        match *self {
            SpeedOutcome::Accepted { speed_cmps } => Some(speed_cmps),
            _ => None,
        }
    }
}

/// Speed state carried across cycles. Units are m/s x 100.
#[derive(Debug, Clone, Default)]
pub struct SpeedCalculator {
    // Deviation baseline: last computed speed, accepted or not
    previous_cmps: i64,
    output_cmps: i64,
    last_raw_cmps: i64,
    last_rps: i64,
}

impl SpeedCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one cycle's (staleness-guarded) speed interval.
    pub fn update(&mut self, interval_us: u64) -> SpeedOutcome {
        if interval_us == 0 {
            self.output_cmps = 0;
            self.previous_cmps = 0;
            self.last_raw_cmps = 0;
            self.last_rps = 0;
            return SpeedOutcome::NoWind;
        }

        let rps = rps_from_interval(interval_us);
        let speed = speed_from_rps(rps);
        let deviation = speed - self.previous_cmps;
        self.last_rps = rps;
        self.last_raw_cmps = speed;

        // Baseline follows every computed sample, so a real step change is
        // accepted on the following cycle instead of locking out.
        self.previous_cmps = speed;

        if speed_deviation_ok(speed, deviation) {
            self.output_cmps = speed;
            SpeedOutcome::Accepted { speed_cmps: speed }
        } else {
            tracing::debug!(
                speed_cmps = speed,
                deviation_cmps = deviation,
                rps,
                "speed sample rejected"
            );
            SpeedOutcome::Rejected {
                speed_cmps: speed,
                deviation_cmps: deviation,
            }
        }
    }

    /// Published speed (m/s x 100).
    #[inline]
    pub fn output_cmps(&self) -> i64 {
        self.output_cmps
    }

    /// Current deviation baseline (m/s x 100).
    #[inline]
    pub fn previous_cmps(&self) -> i64 {
        self.previous_cmps
    }

    /// Last computed, pre-gating speed.
    #[inline]
    pub fn last_raw_cmps(&self) -> i64 {
        self.last_raw_cmps
    }

    #[inline]
    pub fn last_rps(&self) -> i64 {
        self.last_rps
    }
}
