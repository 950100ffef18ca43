//! Output sinks for the apparent wind values.
//!
//! `NmeaMwvSink` emits NMEA 0183 MWV (wind speed and angle) sentences,
//! relative reference, speed in m/s. `JsonLinesSink` emits one JSON object
//! per cycle.
use std::io::Write;

use wind_traits::{ApparentWind, WindSink};

use crate::util::rad_to_whole_deg;

/// XOR of every byte in `body` (the text between `$` and `*`).
#[inline]
pub fn nmea_checksum(body: &str) -> u8 {
    body.bytes().fold(0, |cs, b| cs ^ b)
}

/// `$<talker>MWV,<angle>.0,R,<speed>,M,A*<checksum>` without line terminator.
pub fn mwv_sentence(talker: &str, angle_deg: i32, speed_mps: f32) -> String {
    let body = format!("{talker}MWV,{angle_deg}.0,R,{speed_mps:.2},M,A");
    format!("${body}*{:02X}", nmea_checksum(&body))
}

pub struct NmeaMwvSink<W: Write> {
    out: W,
    talker: String,
}

impl<W: Write> NmeaMwvSink<W> {
    pub fn new(out: W, talker: impl Into<String>) -> Self {
        Self {
            out,
            talker: talker.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> WindSink for NmeaMwvSink<W> {
    fn publish(
        &mut self,
        wind: ApparentWind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let angle_deg = rad_to_whole_deg(wind.angle_rad);
        let sentence = mwv_sentence(&self.talker, angle_deg, wind.speed_mps);
        tracing::trace!(%sentence, "mwv");
        write!(self.out, "{sentence}\r\n")?;
        self.out.flush()?;
        Ok(())
    }
}

pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> WindSink for JsonLinesSink<W> {
    fn publish(
        &mut self,
        wind: ApparentWind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let line = serde_json::json!({
            "speed_mps": wind.speed_mps,
            "angle_rad": wind.angle_rad,
        });
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
