//! `From` implementations bridging `wind_config` types to `wind_core` types.

use crate::config::{DirectionBaseline, TimingCfg, Tuning};

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&wind_config::Timing> for TimingCfg {
    fn from(c: &wind_config::Timing) -> Self {
        Self {
            debounce_us: c.debounce_us,
            pulse_timeout_us: c.pulse_timeout_us,
            period_ms: c.period_ms,
        }
    }
}

// ── Tuning ───────────────────────────────────────────────────────────────────

impl From<&wind_config::Tuning> for Tuning {
    fn from(c: &wind_config::Tuning) -> Self {
        Tuning::new(c.filter_gain, c.direction_offset_deg)
    }
}

// ── DirectionBaseline ────────────────────────────────────────────────────────

impl From<wind_config::DirectionBaseline> for DirectionBaseline {
    fn from(c: wind_config::DirectionBaseline) -> Self {
        match c {
            wind_config::DirectionBaseline::Accepted => DirectionBaseline::Accepted,
            wind_config::DirectionBaseline::Computed => DirectionBaseline::Computed,
        }
    }
}
