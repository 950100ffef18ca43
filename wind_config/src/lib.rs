#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the wind digitizer.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Timing defaults match the digitizer's built-in constants, so a config
//!   only needs `[pins]` to be complete.
use serde::Deserialize;

/// Default minimum time between accepted edges on one channel.
pub const DEFAULT_DEBOUNCE_US: u64 = 10_000;
/// Default time without a speed edge after which the wind is considered stopped.
pub const DEFAULT_PULSE_TIMEOUT_US: u64 = 1_500_000;
/// Default sampling period.
pub const DEFAULT_PERIOD_MS: u64 = 200;
/// Default direction filter gain; 1.0 disables filtering.
pub const DEFAULT_FILTER_GAIN: f32 = 0.25;

#[derive(Debug, Deserialize)]
pub struct Pins {
    /// BCM pin of the anemometer (speed) reed contact.
    pub speed: u8,
    /// BCM pin of the wind-vane (direction) contact.
    pub direction: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub debounce_us: u64,
    pub pulse_timeout_us: u64,
    pub period_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            debounce_us: DEFAULT_DEBOUNCE_US,
            pulse_timeout_us: DEFAULT_PULSE_TIMEOUT_US,
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Direction output filter gain. Range: 0.0 to 1.0; smaller filters harder.
    pub filter_gain: f32,
    /// Manual direction offset in whole degrees, any sign.
    pub direction_offset_deg: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            filter_gain: DEFAULT_FILTER_GAIN,
            direction_offset_deg: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectionBaseline {
    /// Compare against the last accepted raw angle
    #[default]
    Accepted,
    /// Compare against the last computed raw angle, accepted or not
    Computed,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Gating {
    pub direction_baseline: DirectionBaseline,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// NMEA 0183 MWV sentences
    #[default]
    Nmea,
    /// One JSON object per cycle
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Output {
    pub format: OutputFormat,
    /// NMEA talker id prefixed to MWV sentences
    pub talker: String,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            format: OutputFormat::Nmea,
            talker: "WI".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Anemometer rotations per hundred seconds
    pub rps: f32,
    /// Apparent wind angle the vane pulses are placed at
    pub angle_deg: f32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            rps: 1000.0,
            angle_deg: 10.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub gating: Gating,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate semantic constraints not expressible in the schema.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.pins.speed == self.pins.direction {
            eyre::bail!(
                "invalid configuration: pins.speed and pins.direction must differ (both {})",
                self.pins.speed
            );
        }
        if self.timing.period_ms == 0 {
            eyre::bail!("invalid configuration: timing.period_ms must be > 0");
        }
        if self.timing.debounce_us == 0 {
            eyre::bail!("invalid configuration: timing.debounce_us must be > 0");
        }
        if self.timing.pulse_timeout_us <= self.timing.debounce_us {
            eyre::bail!(
                "invalid configuration: timing.pulse_timeout_us ({}) must exceed timing.debounce_us ({})",
                self.timing.pulse_timeout_us,
                self.timing.debounce_us
            );
        }
        let gain = self.tuning.filter_gain;
        if !gain.is_finite() || !(0.0..=1.0).contains(&gain) {
            eyre::bail!(
                "invalid configuration: tuning.filter_gain must be within [0.0, 1.0], got {gain}"
            );
        }
        let talker = self.output.talker.as_bytes();
        if talker.len() != 2 || !talker.iter().all(u8::is_ascii_uppercase) {
            eyre::bail!(
                "invalid configuration: output.talker must be two uppercase ASCII letters, got {:?}",
                self.output.talker
            );
        }
        let rps = self.simulation.rps;
        if !rps.is_finite() || rps < 0.0 {
            eyre::bail!("invalid configuration: simulation.rps must be finite and >= 0, got {rps}");
        }
        if !self.simulation.angle_deg.is_finite() {
            eyre::bail!("invalid configuration: simulation.angle_deg must be finite");
        }
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!(
                "invalid configuration: logging.rotation must be never, daily or hourly, got {rotation:?}"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = load_toml("[pins]\nspeed = 12\ndirection = 14\n").unwrap();
        assert_eq!(cfg.timing.debounce_us, DEFAULT_DEBOUNCE_US);
        assert_eq!(cfg.timing.pulse_timeout_us, DEFAULT_PULSE_TIMEOUT_US);
        assert_eq!(cfg.timing.period_ms, DEFAULT_PERIOD_MS);
        assert_eq!(cfg.tuning.filter_gain, DEFAULT_FILTER_GAIN);
        assert_eq!(cfg.tuning.direction_offset_deg, 0);
        assert_eq!(cfg.output.format, OutputFormat::Nmea);
        assert_eq!(cfg.output.talker, "WI");
        assert_eq!(cfg.gating.direction_baseline, DirectionBaseline::Accepted);
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_pins_is_a_parse_error() {
        assert!(load_toml("[tuning]\nfilter_gain = 0.5\n").is_err());
    }
}
