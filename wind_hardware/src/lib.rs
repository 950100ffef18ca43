//! Edge sources for the wind digitizer.
//!
//! Both sources feed an `Arc<EdgeCapture>` through its `on_speed_edge` /
//! `on_direction_edge` handlers:
//! - [`SimulatedAnemometer`]: a background thread producing the pulse train of
//!   a given rotation rate and wind angle. Always built.
//! - `gpio::GpioWindInputs`: falling-edge interrupts on two Raspberry Pi
//!   inputs. Requires the `hardware` feature.
pub mod error;
#[cfg(feature = "hardware")]
pub mod gpio;
pub mod sim;

pub use error::HwError;
#[cfg(feature = "hardware")]
pub use gpio::GpioWindInputs;
pub use sim::{SimulatedAnemometer, direction_fraction_for, revolution_period_us};
