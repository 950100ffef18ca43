//! Seams between the wind digitizer and its host: time, input lines and the
//! output boundary.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// A digital input line whose level can be re-read from an edge handler.
pub trait PulseLine {
    /// True when the line currently reads low.
    fn is_low(&self) -> bool;
}

impl PulseLine for bool {
    /// A bare `bool` stands for an already-sampled "is low" level.
    #[inline]
    fn is_low(&self) -> bool {
        *self
    }
}

/// One published apparent-wind reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ApparentWind {
    /// Apparent wind speed in meters per second.
    pub speed_mps: f32,
    /// Apparent wind angle in radians, [0, 2π).
    pub angle_rad: f32,
}

/// Receives the filtered values once per sampling cycle.
pub trait WindSink {
    fn publish(
        &mut self,
        wind: ApparentWind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<S: WindSink + ?Sized> WindSink for Box<S> {
    fn publish(
        &mut self,
        wind: ApparentWind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).publish(wind)
    }
}
