use std::sync::Arc;

use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use tracing::{info, warn};
use wind_core::EdgeCapture;
use wind_traits::Clock;

use crate::error::Result;

/// Anemometer and vane contacts on two pulled-up GPIO inputs.
///
/// Falling-edge interrupts call straight into the capture handlers. The
/// level rppal reports with the interrupt is the re-read line level, so a
/// line already released by the time the callback runs is discarded.
/// Interrupts stay registered until this value is dropped.
pub struct GpioWindInputs {
    speed: InputPin,
    direction: InputPin,
}

impl GpioWindInputs {
    pub fn attach<C>(speed_pin: u8, direction_pin: u8, capture: Arc<EdgeCapture<C>>) -> Result<Self>
    where
        C: Clock + Send + Sync + 'static,
    {
        let gpio = Gpio::new()?;
        let mut speed = gpio.get(speed_pin)?.into_input_pullup();
        let mut direction = gpio.get(direction_pin)?.into_input_pullup();

        let speed_capture = capture.clone();
        speed.set_async_interrupt(Trigger::FallingEdge, move |level: Level| {
            speed_capture.on_speed_edge(&(level == Level::Low));
        })?;
        direction.set_async_interrupt(Trigger::FallingEdge, move |level: Level| {
            capture.on_direction_edge(&(level == Level::Low));
        })?;

        info!(speed_pin, direction_pin, "gpio wind inputs attached");
        Ok(Self { speed, direction })
    }

    /// (speed, direction) BCM pin numbers.
    pub fn pins(&self) -> (u8, u8) {
        (self.speed.pin(), self.direction.pin())
    }
}

impl Drop for GpioWindInputs {
    fn drop(&mut self) {
        if let Err(e) = self.speed.clear_async_interrupt() {
            warn!(error = %e, "clearing speed interrupt failed");
        }
        if let Err(e) = self.direction.clear_async_interrupt() {
            warn!(error = %e, "clearing direction interrupt failed");
        }
    }
}
