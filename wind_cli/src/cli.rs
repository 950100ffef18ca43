//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "wind", version, about = "Pulse-train wind digitizer")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/wind_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Output encoding for published readings.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FormatArg {
    /// NMEA 0183 MWV sentences
    Nmea,
    /// One JSON object per line
    Json,
}

impl From<FormatArg> for wind_config::OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Nmea => wind_config::OutputFormat::Nmea,
            FormatArg::Json => wind_config::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the wind inputs and publish readings to stdout
    Run {
        /// Stop after this many cycles (default: run until Ctrl-C)
        #[arg(
            long,
            value_name = "N",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        cycles: Option<u64>,
        /// Output format (overrides output.format)
        #[arg(long, value_enum, value_name = "FORMAT")]
        format: Option<FormatArg>,
        /// Direction filter gain in [0, 1] (overrides tuning.filter_gain)
        #[arg(long, value_name = "G")]
        filter_gain: Option<f32>,
        /// Direction offset in degrees (overrides tuning.direction_offset_deg)
        #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
        offset: Option<i32>,
        /// Simulated rotation rate, rotations per 100 s (overrides simulation.rps)
        #[arg(long, value_name = "R", allow_negative_numbers = true)]
        sim_rps: Option<f32>,
        /// Simulated apparent wind angle in degrees (overrides simulation.angle_deg)
        #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
        sim_angle: Option<f32>,
        /// Print final diagnostics and cycle stats to stderr
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Quick health check (config, inputs, a few cycles)
    SelfCheck,
    /// Run a few cycles and print the latest diagnostics
    Diag,
}
