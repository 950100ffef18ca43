//! Anemometer calibration: pulse interval to rotations, rotations to speed.
//!
//! The three-band quadratic follows the sensor maker's piecewise calibration
//! data. Every division truncates and runs in the written order; rearranging
//! the terms changes the output.

/// Rotations per hundred seconds = `RPS_NUMERATOR / interval_us`.
pub const RPS_NUMERATOR: u64 = 100_000_000;
/// First rps at which the middle calibration band applies.
pub const CAL_BAND_1_RPS: i64 = 323;
/// First rps at which the high calibration band applies.
pub const CAL_BAND_2_RPS: i64 = 5436;

/// Rotations per hundred seconds for a non-zero speed pulse interval.
#[inline]
pub fn rps_from_interval(interval_us: u64) -> i64 {
    debug_assert!(interval_us > 0, "rps_from_interval: zero interval");
    (RPS_NUMERATOR / interval_us.max(1)) as i64
}

/// Calibrated speed in m/s x 100 for a rotation rate, clamped at zero.
#[inline]
pub fn speed_from_rps(rps: i64) -> i64 {
    let speed = if rps < CAL_BAND_1_RPS {
        (rps * rps * -11) / 22369 + (293 * rps) / 223 - 12
    } else if rps < CAL_BAND_2_RPS {
        (rps * rps / 2) / 22369 + (220 * rps) / 223 + 96
    } else {
        (rps * rps * 11) / 22369 - (957 * rps) / 223 + 28664
    };
    speed.max(0)
}
