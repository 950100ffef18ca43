//! Unit helpers shared by the calculators and the output boundary.

/// Centi-m/s (m/s x 100) to whole m/s as published: integer-truncated first.
#[inline]
pub fn cmps_to_published_mps(speed_cmps: i64) -> f32 {
    (speed_cmps / 100) as f32
}

/// Whole degrees to radians.
#[inline]
pub fn deg_to_rad(deg: i32) -> f32 {
    deg as f32 * core::f32::consts::PI / 180.0
}

/// Radians back to whole degrees in [0, 360).
#[inline]
pub fn rad_to_whole_deg(rad: f32) -> i32 {
    if !rad.is_finite() {
        return 0;
    }
    (rad.to_degrees().round() as i32).rem_euclid(360)
}
