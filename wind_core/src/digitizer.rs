//! The periodic half of the digitizer and its type-state builder.
//!
//! One `cycle()` takes a snapshot of the edge timing, applies the staleness
//! guard, runs the speed calculator and, when the speed sample was accepted,
//! the direction calculator. `step()` also hands the result to a sink.

use std::marker::PhantomData;
use std::sync::Arc;

use wind_traits::{ApparentWind, Clock, MonotonicClock, WindSink};

use crate::config::{DirectionBaseline, TimingCfg, Tuning};
use crate::diagnostics::Diagnostics;
use crate::direction::{DirectionCalculator, DirectionOutcome};
use crate::edge::EdgeCapture;
use crate::error::{BuildError, Result, map_sink_error};
use crate::speed::{SpeedCalculator, SpeedOutcome};

pub struct WindDigitizer<C: Clock = MonotonicClock> {
    capture: Arc<EdgeCapture<C>>,
    timing: TimingCfg,
    tuning: Tuning,
    speed: SpeedCalculator,
    direction: DirectionCalculator,
    last: Diagnostics,
}

impl<C: Clock> core::fmt::Debug for WindDigitizer<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindDigitizer")
            .field("timing", &self.timing)
            .field("speed_out_cmps", &self.speed.output_cmps())
            .field("filtered_direction_deg", &self.direction.filtered_deg())
            .finish()
    }
}

impl<C: Clock> WindDigitizer<C> {
    /// Start building a digitizer.
    pub fn builder() -> DigitizerBuilder<C, Missing> {
        DigitizerBuilder::default()
    }

    /// One sampling cycle without publishing.
    pub fn cycle(&mut self) -> Diagnostics {
        let now_us = self.capture.now_us();
        let edges = self.capture.snapshot();
        let stale = edges.is_stale(now_us, self.timing.pulse_timeout_us);
        if stale && !self.last.stale && edges.speed_interval_us != 0 {
            tracing::debug!(
                since_last_edge_us = now_us.saturating_sub(edges.speed_pulse_at_us),
                "speed input stale, forcing no wind"
            );
        }
        let edges = edges.with_staleness_guard(now_us, self.timing.pulse_timeout_us);

        // Read the live parameters once so the whole cycle sees one value.
        let filter_gain = self.tuning.filter_gain();
        let offset_deg = self.tuning.direction_offset_deg();

        let speed = self.speed.update(edges.speed_interval_us);
        let direction = match speed.accepted_speed() {
            Some(speed_cmps) => self.direction.update(
                edges.direction_interval_us,
                edges.speed_interval_us,
                speed_cmps,
                offset_deg,
                filter_gain,
            ),
            None => DirectionOutcome::Skipped,
        };

        self.last = Diagnostics {
            filter_gain,
            direction_offset_deg: offset_deg,
            raw_direction_deg: self.direction.last_raw_deg(),
            filtered_direction_deg: self.direction.filtered_deg(),
            raw_speed_cmps: self.speed.last_raw_cmps(),
            speed_out_cmps: self.speed.output_cmps(),
            rps: self.speed.last_rps(),
            ignored_reading: matches!(speed, SpeedOutcome::Rejected { .. }),
            stale,
            speed,
            direction,
        };
        tracing::trace!(
            now_us,
            speed_interval_us = edges.speed_interval_us,
            direction_interval_us = edges.direction_interval_us,
            speed_out_cmps = self.last.speed_out_cmps,
            filtered_direction_deg = self.last.filtered_direction_deg,
            "cycle"
        );
        self.last
    }

    /// One sampling cycle, then publish. A failing sink is logged and the
    /// cycle still counts.
    pub fn step<S: WindSink + ?Sized>(&mut self, sink: &mut S) -> Diagnostics {
        let diag = self.cycle();
        if let Err(e) = sink.publish(diag.apparent_wind()) {
            let err = map_sink_error(e.as_ref());
            tracing::warn!(error = %err, "publish failed");
        }
        diag
    }

    /// Diagnostics of the most recent cycle.
    #[inline]
    pub fn diagnostics(&self) -> Diagnostics {
        self.last
    }

    /// Current published values.
    #[inline]
    pub fn apparent_wind(&self) -> ApparentWind {
        self.last.apparent_wind()
    }

    #[inline]
    pub fn speed_out_cmps(&self) -> i64 {
        self.speed.output_cmps()
    }

    #[inline]
    pub fn filtered_direction_deg(&self) -> i32 {
        self.direction.filtered_deg()
    }

    /// Deviation baselines: (previous speed, previous raw direction).
    #[inline]
    pub fn baselines(&self) -> (i64, i32) {
        let speed = self.speed.previous_cmps();
        (speed, self.direction.previous_raw_deg())
    }

    #[inline]
    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    #[inline]
    pub fn capture(&self) -> &Arc<EdgeCapture<C>> {
        &self.capture
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `WindDigitizer`. The edge capture is required before `build()`.
pub struct DigitizerBuilder<C: Clock, K> {
    capture: Option<Arc<EdgeCapture<C>>>,
    timing: Option<TimingCfg>,
    tuning: Option<Tuning>,
    direction_baseline: DirectionBaseline,
    _k: PhantomData<K>,
}

impl<C: Clock> Default for DigitizerBuilder<C, Missing> {
    fn default() -> Self {
        Self {
            capture: None,
            timing: None,
            tuning: None,
            direction_baseline: DirectionBaseline::default(),
            _k: PhantomData,
        }
    }
}

impl<C: Clock, K> DigitizerBuilder<C, K> {
    pub fn with_capture(self, capture: Arc<EdgeCapture<C>>) -> DigitizerBuilder<C, Set> {
        DigitizerBuilder {
            capture: Some(capture),
            timing: self.timing,
            tuning: self.tuning,
            direction_baseline: self.direction_baseline,
            _k: PhantomData,
        }
    }

    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Live tuning handle; keep a clone to adjust values while running.
    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    pub fn with_direction_baseline(mut self, baseline: DirectionBaseline) -> Self {
        self.direction_baseline = baseline;
        self
    }

    /// Build with runtime checks only.
    pub fn try_build(self) -> Result<WindDigitizer<C>> {
        let capture = self
            .capture
            .ok_or_else(|| eyre::Report::new(BuildError::MissingCapture))?;
        let timing = self.timing.unwrap_or_default();
        if timing.period_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "period_ms must be > 0",
            )));
        }
        if timing.pulse_timeout_us <= capture.debounce_us() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "pulse_timeout_us must exceed the capture debounce",
            )));
        }
        Ok(WindDigitizer {
            capture,
            timing,
            tuning: self.tuning.unwrap_or_default(),
            speed: SpeedCalculator::new(),
            direction: DirectionCalculator::with_baseline(self.direction_baseline),
            last: Diagnostics::default(),
        })
    }
}

impl<C: Clock> DigitizerBuilder<C, Set> {
    pub fn build(self) -> Result<WindDigitizer<C>> {
        self.try_build()
    }
}
