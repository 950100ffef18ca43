//! Deviation bands: the outlier-rejection limit depends on how fast the wind is.

/// Speeds (m/s x 100) below this are in the light band.
pub const BAND_0_CMPS: i64 = 500;
/// Speeds below this (and not light) are in the moderate band.
pub const BAND_1_CMPS: i64 = 4000;

/// Max speed change from the previous sample, per band (m/s x 100).
pub const SPEED_DEV_LIMIT_CMPS: [i64; 3] = [500, 1000, 3000];
/// Max direction change from the previous sample, per band (degrees).
/// Larger at low speed, where the vane wanders more between updates.
pub const DIR_DEV_LIMIT_DEG: [i32; 3] = [25, 18, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedBand {
    Light,
    Moderate,
    Strong,
}

impl SpeedBand {
    /// Band for a speed, by magnitude.
    #[inline]
    pub fn classify(speed_cmps: i64) -> Self {
        let mag = speed_cmps.unsigned_abs();
        if mag < BAND_0_CMPS as u64 {
            SpeedBand::Light
        } else if mag < BAND_1_CMPS as u64 {
            SpeedBand::Moderate
        } else {
            SpeedBand::Strong
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            SpeedBand::Light => 0,
            SpeedBand::Moderate => 1,
            SpeedBand::Strong => 2,
        }
    }

    #[inline]
    pub fn speed_limit_cmps(self) -> i64 {
        SPEED_DEV_LIMIT_CMPS[self.index()]
    }

    #[inline]
    pub fn direction_limit_deg(self) -> i32 {
        DIR_DEV_LIMIT_DEG[self.index()]
    }
}

/// True if a speed change is strictly inside the limit for `speed_cmps`'s band.
#[inline]
pub fn speed_deviation_ok(speed_cmps: i64, deviation_cmps: i64) -> bool {
    deviation_cmps.unsigned_abs() < SpeedBand::classify(speed_cmps).speed_limit_cmps() as u64
}

/// True if a direction change is inside the limit for `speed_cmps`'s band,
/// measured either way round the circle (359° to 1° is 2°, not 358°).
#[inline]
pub fn direction_deviation_ok(speed_cmps: i64, deviation_deg: i32) -> bool {
    let limit = SpeedBand::classify(speed_cmps)
        .direction_limit_deg()
        .unsigned_abs();
    let dev = deviation_deg.unsigned_abs();
    dev < limit || dev > 360 - limit
}
