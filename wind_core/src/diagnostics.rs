//! Per-cycle diagnostic snapshot. Observability only; nothing reads it back.

use wind_traits::ApparentWind;

use crate::direction::DirectionOutcome;
use crate::speed::SpeedOutcome;
use crate::util::{cmps_to_published_mps, deg_to_rad};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// Filter gain read this cycle.
    pub filter_gain: f32,
    /// Direction offset read this cycle.
    pub direction_offset_deg: i32,
    /// Last computed raw angle, or the indeterminate sentinel.
    pub raw_direction_deg: i32,
    pub filtered_direction_deg: i32,
    /// Last computed speed before gating (m/s x 100).
    pub raw_speed_cmps: i64,
    /// Published speed (m/s x 100).
    pub speed_out_cmps: i64,
    /// Rotations per hundred seconds.
    pub rps: i64,
    /// This cycle's speed sample was rejected.
    pub ignored_reading: bool,
    /// Last speed edge older than the pulse timeout.
    pub stale: bool,
    pub speed: SpeedOutcome,
    pub direction: DirectionOutcome,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            filter_gain: 0.0,
            direction_offset_deg: 0,
            raw_direction_deg: 0,
            filtered_direction_deg: 0,
            raw_speed_cmps: 0,
            speed_out_cmps: 0,
            rps: 0,
            ignored_reading: false,
            stale: false,
            speed: SpeedOutcome::NoWind,
            direction: DirectionOutcome::Skipped,
        }
    }
}

impl Diagnostics {
    /// The values handed to the output boundary.
    #[inline]
    pub fn apparent_wind(&self) -> ApparentWind {
        ApparentWind {
            speed_mps: cmps_to_published_mps(self.speed_out_cmps),
            angle_rad: deg_to_rad(self.filtered_direction_deg),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let speed = match self.speed {
            SpeedOutcome::NoWind => "no_wind",
            SpeedOutcome::Accepted { .. } => "accepted",
            SpeedOutcome::Rejected { .. } => "rejected",
        };
        let direction = match self.direction {
            DirectionOutcome::Skipped => "skipped",
            DirectionOutcome::Indeterminate => "indeterminate",
            DirectionOutcome::Accepted { .. } => "accepted",
            DirectionOutcome::Rejected { .. } => "rejected",
        };
        json!({
            "filter_gain": self.filter_gain,
            "direction_offset_deg": self.direction_offset_deg,
            "raw_direction_deg": self.raw_direction_deg,
            "filtered_direction_deg": self.filtered_direction_deg,
            "raw_speed_cmps": self.raw_speed_cmps,
            "speed_out_cmps": self.speed_out_cmps,
            "rps": self.rps,
            "ignored_reading": self.ignored_reading,
            "stale": self.stale,
            "speed_outcome": speed,
            "direction_outcome": direction,
        })
    }
}
