#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Pulse-train wind digitizer (hardware-agnostic).
//!
//! Turns the falling edges of an anemometer (speed) line and a wind-vane
//! (direction) line into a calibrated apparent wind speed and angle at a
//! fixed cadence. Hardware reaches this crate only through the
//! `wind_traits::PulseLine` level and the `wind_traits::WindSink` output.
//!
//! ## Architecture
//!
//! - **Edge capture**: interrupt-side handlers and the shared timing fields (`edge`)
//! - **Speed**: rps, piecewise calibration, band-gated output (`calibration`, `bands`, `speed`)
//! - **Direction**: raw angle, circular gating, shortest-path smoothing (`direction`)
//! - **Cycle**: snapshot, staleness guard, calculators, publish (`digitizer`)
//! - **Cadence**: the periodic thread (`sampler`)
//! - **Output**: NMEA MWV and JSON-lines sinks (`sink`)
//!
//! ## Integer units
//!
//! Speed is carried in **centi-m/s** (m/s x 100) as `i64`, direction in
//! whole degrees as `i32`. Only the published values are floating point.

pub mod bands;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod diagnostics;
pub mod digitizer;
pub mod direction;
pub mod edge;
pub mod error;
pub mod mocks;
pub mod sampler;
pub mod sink;
pub mod speed;
pub mod util;

pub use config::{DirectionBaseline, TimingCfg, Tuning};
pub use diagnostics::Diagnostics;
pub use digitizer::{DigitizerBuilder, WindDigitizer};
pub use direction::{DirectionOutcome, INDETERMINATE_DEG};
pub use edge::{EdgeCapture, EdgeEvent, EdgeSnapshot};
pub use error::{BuildError, WindError};
pub use speed::SpeedOutcome;
