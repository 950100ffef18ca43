//! Test and helper sinks for wind_core

use std::sync::{Arc, Mutex};

use wind_traits::{ApparentWind, WindSink};

/// A sink that drops every reading; useful for self-checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl WindSink for NullSink {
    fn publish(
        &mut self,
        _wind: ApparentWind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// A sink that keeps every reading; clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    readings: Arc<Mutex<Vec<ApparentWind>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readings(&self) -> Vec<ApparentWind> {
        self.readings.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<ApparentWind> {
        self.readings.lock().ok().and_then(|r| r.last().copied())
    }
}

impl WindSink for RecordingSink {
    fn publish(
        &mut self,
        wind: ApparentWind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.readings
            .lock()
            .map_err(|_| std::io::Error::other("recording sink poisoned"))?
            .push(wind);
        Ok(())
    }
}
