//! Input assembly, the run loop, self-check and diagnostics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use wind_config::{Config, OutputFormat};
use wind_core::mocks::NullSink;
use wind_core::sampler::Sampler;
use wind_core::sink::{JsonLinesSink, NmeaMwvSink};
use wind_core::{Diagnostics, EdgeCapture, TimingCfg, Tuning, WindDigitizer, WindError};
use wind_hardware::{SimulatedAnemometer, revolution_period_us};
use wind_traits::{MonotonicClock, WindSink};

const SELF_CHECK_CYCLES: u64 = 3;
const DIAG_CYCLES: u64 = 5;
const POLL: Duration = Duration::from_millis(100);

pub struct RunOpts {
    pub cycles: Option<u64>,
    pub format: OutputFormat,
    pub filter_gain: Option<f32>,
    pub offset_deg: Option<i32>,
    pub sim_rps: Option<f32>,
    pub sim_angle_deg: Option<f32>,
    pub stats: bool,
}

/// The active edge source. Dropping it detaches the inputs.
pub enum EdgeSource {
    #[cfg_attr(feature = "hardware", allow(dead_code))]
    Simulated(SimulatedAnemometer),
    #[cfg(feature = "hardware")]
    Gpio(wind_hardware::GpioWindInputs),
}

impl EdgeSource {
    fn label(&self) -> String {
        match self {
            EdgeSource::Simulated(sim) => format!("simulated, {} revolutions", sim.revolutions()),
            #[cfg(feature = "hardware")]
            EdgeSource::Gpio(gpio) => {
                let (speed, direction) = gpio.pins();
                format!("gpio speed={speed} direction={direction}")
            }
        }
    }
}

fn assemble(cfg: &Config, tuning: Tuning) -> eyre::Result<(Arc<EdgeCapture>, WindDigitizer)> {
    let timing = TimingCfg::from(&cfg.timing);
    let capture = Arc::new(EdgeCapture::new(MonotonicClock::new(), timing.debounce_us));
    let digitizer = WindDigitizer::builder()
        .with_capture(capture.clone())
        .with_timing(timing)
        .with_tuning(tuning)
        .with_direction_baseline(cfg.gating.direction_baseline.into())
        .build()?;
    Ok((capture, digitizer))
}

fn simulator(
    capture: Arc<EdgeCapture>,
    rps: f32,
    angle_deg: f32,
) -> eyre::Result<SimulatedAnemometer> {
    if !rps.is_finite() || rps < 0.0 {
        return Err(WindError::Config(format!(
            "simulated rate must be finite and >= 0, got {rps}"
        ))
        .into());
    }
    Ok(SimulatedAnemometer::spawn(capture, rps, angle_deg)?)
}

/// GPIO inputs with the `hardware` feature, the simulator otherwise.
fn attach_inputs(
    cfg: &Config,
    capture: Arc<EdgeCapture>,
    rps: f32,
    angle_deg: f32,
) -> eyre::Result<EdgeSource> {
    #[cfg(feature = "hardware")]
    {
        let _ = (rps, angle_deg);
        let gpio =
            wind_hardware::GpioWindInputs::attach(cfg.pins.speed, cfg.pins.direction, capture)
                .map_err(|e| WindError::Hardware(e.to_string()))?;
        Ok(EdgeSource::Gpio(gpio))
    }
    #[cfg(not(feature = "hardware"))]
    {
        tracing::info!(
            speed_pin = cfg.pins.speed,
            direction_pin = cfg.pins.direction,
            "built without hardware support; simulating inputs"
        );
        Ok(EdgeSource::Simulated(simulator(capture, rps, angle_deg)?))
    }
}

fn stdout_sink(format: OutputFormat, talker: &str) -> Box<dyn WindSink + Send> {
    match format {
        OutputFormat::Nmea => Box::new(NmeaMwvSink::new(std::io::stdout(), talker)),
        OutputFormat::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
    }
}

/// Wait for a bounded sampler to finish; returns the last diagnostics seen.
fn drain(sampler: &Sampler, limit: Duration, shutdown: Option<&AtomicBool>) -> Option<Diagnostics> {
    let start = Instant::now();
    let mut last = None;
    while !sampler.is_finished() {
        if shutdown.is_some_and(|s| s.load(Ordering::Relaxed)) {
            tracing::info!("interrupted");
            break;
        }
        if start.elapsed() > limit {
            tracing::warn!(ticks = sampler.ticks(), "sampler did not finish in time");
            break;
        }
        if let Some(d) = sampler.wait_next(POLL) {
            last = Some(d);
        }
    }
    sampler.latest().or(last)
}

/// Simulation overrides given on the command line.
#[cfg_attr(not(feature = "hardware"), allow(dead_code))]
fn ignored_sim_flags(opts: &RunOpts) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if opts.sim_rps.is_some() {
        flags.push("--sim-rps");
    }
    if opts.sim_angle_deg.is_some() {
        flags.push("--sim-angle");
    }
    flags
}

pub fn run(cfg: &Config, opts: &RunOpts, shutdown: &AtomicBool) -> eyre::Result<()> {
    let tuning = Tuning::from(&cfg.tuning);
    if let Some(gain) = opts.filter_gain {
        if !gain.is_finite() || !(0.0..=1.0).contains(&gain) {
            return Err(WindError::Config(format!(
                "--filter-gain must be within [0.0, 1.0], got {gain}"
            ))
            .into());
        }
        tuning.set_filter_gain(gain);
    }
    if let Some(offset) = opts.offset_deg {
        tuning.set_direction_offset_deg(offset);
    }
    #[cfg(feature = "hardware")]
    {
        let ignored = ignored_sim_flags(opts);
        if !ignored.is_empty() {
            tracing::warn!(flags = ?ignored, "simulation flags have no effect on gpio inputs");
        }
    }
    let rps = opts.sim_rps.unwrap_or(cfg.simulation.rps);
    let angle_deg = opts.sim_angle_deg.unwrap_or(cfg.simulation.angle_deg);

    let (capture, digitizer) = assemble(cfg, tuning)?;
    let period = digitizer.timing().period();
    let source = attach_inputs(cfg, capture, rps, angle_deg)?;
    let sink = stdout_sink(opts.format, &cfg.output.talker);
    let sampler = Sampler::spawn_with_limit(digitizer, sink, opts.cycles);
    tracing::info!(
        inputs = %source.label(),
        format = ?opts.format,
        cycles = ?opts.cycles,
        "running"
    );

    // Unbounded runs end on Ctrl-C only.
    let limit = opts.cycles.map_or(Duration::MAX, |n| {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        period
            .saturating_mul(n)
            .saturating_mul(2)
            .saturating_add(Duration::from_secs(5))
    });
    let last = drain(&sampler, limit, Some(shutdown));
    let ticks = sampler.ticks();
    let overruns = sampler.overruns();
    drop(sampler);
    tracing::info!(ticks, overruns, inputs = %source.label(), "stopped");
    drop(source);

    if opts.stats {
        eprintln!("cycles: {ticks}");
        eprintln!("overruns: {overruns}");
        if let Some(d) = last {
            eprintln!("last: {}", d.to_json());
        }
    }
    Ok(())
}

/// Config is already validated; check inputs and a few simulated cycles.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    #[cfg(feature = "hardware")]
    {
        let probe = Arc::new(EdgeCapture::new(
            MonotonicClock::new(),
            cfg.timing.debounce_us,
        ));
        let gpio =
            wind_hardware::GpioWindInputs::attach(cfg.pins.speed, cfg.pins.direction, probe)
                .map_err(|e| WindError::Hardware(e.to_string()))?;
        drop(gpio);
        tracing::info!("gpio inputs ok");
    }

    let (capture, digitizer) = assemble(cfg, Tuning::from(&cfg.tuning))?;
    let period = digitizer.timing().period();
    let started = Instant::now();
    let sim = simulator(capture, cfg.simulation.rps, cfg.simulation.angle_deg)?;
    let sampler = Sampler::spawn_with_limit(digitizer, NullSink, Some(SELF_CHECK_CYCLES));
    let limit = period * (SELF_CHECK_CYCLES as u32 + 5);
    drain(&sampler, limit, None);
    let ticks = sampler.ticks();
    drop(sampler);

    if ticks < SELF_CHECK_CYCLES {
        return Err(WindError::State(format!(
            "sampler completed {ticks} of {SELF_CHECK_CYCLES} cycles"
        ))
        .into());
    }
    let elapsed_us = started.elapsed().as_micros();
    let expect_edges = revolution_period_us(cfg.simulation.rps)
        .is_some_and(|p| 2 * u128::from(p) < elapsed_us);
    if expect_edges && sim.revolutions() == 0 {
        let err = WindError::State("simulated inputs produced no edges".into());
        return Err(err.into());
    }
    tracing::info!(ticks, revolutions = sim.revolutions(), "self-check ok");
    Ok(())
}

/// A few cycles against the configured inputs; the last diagnostics.
pub fn diag(cfg: &Config) -> eyre::Result<Diagnostics> {
    let (capture, digitizer) = assemble(cfg, Tuning::from(&cfg.tuning))?;
    let period = digitizer.timing().period();
    let source = attach_inputs(cfg, capture, cfg.simulation.rps, cfg.simulation.angle_deg)?;
    let sampler = Sampler::spawn_with_limit(digitizer, NullSink, Some(DIAG_CYCLES));
    let last = drain(&sampler, period * (DIAG_CYCLES as u32 + 5), None);
    drop(sampler);
    drop(source);
    let last = last.ok_or_else(|| WindError::State("no diagnostics were produced".into()))?;
    Ok(last)
}

pub fn render_diagnostics(d: &Diagnostics) -> String {
    format!(
        "speed_out_cmps: {}\nraw_speed_cmps: {}\nrps: {}\nfiltered_direction_deg: {}\nraw_direction_deg: {}\nfilter_gain: {}\ndirection_offset_deg: {}\nignored_reading: {}\nstale: {}\nspeed: {:?}\ndirection: {:?}\n",
        d.speed_out_cmps,
        d.raw_speed_cmps,
        d.rps,
        d.filtered_direction_deg,
        d.raw_direction_deg,
        d.filter_gain,
        d.direction_offset_deg,
        d.ignored_reading,
        d.stale,
        d.speed,
        d.direction,
    )
}
