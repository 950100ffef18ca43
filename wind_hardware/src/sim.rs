//! Simulated anemometer and wind vane.
//!
//! Each revolution produces one vane edge at the fraction of the revolution
//! that encodes the requested angle, then one anemometer edge closing the
//! revolution. Time is taken from the capture's clock.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use wind_core::EdgeCapture;
use wind_traits::Clock;

use crate::error::Result;

// Longest uninterrupted sleep, so a stop request is seen promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Revolution period for a rate in rotations per hundred seconds.
/// `None` when the anemometer is not turning.
pub fn revolution_period_us(rps_per_100s: f32) -> Option<u64> {
    if !rps_per_100s.is_finite() || rps_per_100s <= 0.0 {
        return None;
    }
    Some((100_000_000.0 / f64::from(rps_per_100s)).max(1.0) as u64)
}

/// Position of the vane edge within a revolution, as a fraction in (0, 1),
/// such that the digitizer reads `angle_deg` (rounded) under `offset_deg`.
///
/// The edge is placed half a degree into the target degree so integer
/// truncation lands on it.
pub fn direction_fraction_for(angle_deg: f32, offset_deg: i32) -> f64 {
    let angle = if angle_deg.is_finite() {
        angle_deg.round() as i64
    } else {
        0
    };
    let fraction_deg = (i64::from(offset_deg) - angle).rem_euclid(360);
    (fraction_deg as f64 + 0.5) / 360.0
}

#[derive(Debug)]
struct SimState {
    rps_bits: AtomicU32,
    angle_bits: AtomicU32,
    revolutions: AtomicU64,
    shutdown: AtomicBool,
}

/// Pulse generator for an aligned sensor (zero mounting offset).
pub struct SimulatedAnemometer {
    state: Arc<SimState>,
    join_handle: Option<JoinHandle<()>>,
}

impl SimulatedAnemometer {
    pub fn spawn<C>(capture: Arc<EdgeCapture<C>>, rps_per_100s: f32, angle_deg: f32) -> Result<Self>
    where
        C: Clock + Send + Sync + 'static,
    {
        let state = Arc::new(SimState {
            rps_bits: AtomicU32::new(rps_per_100s.to_bits()),
            angle_bits: AtomicU32::new(angle_deg.to_bits()),
            revolutions: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        });
        let shared = state.clone();
        let join_handle = std::thread::Builder::new()
            .name("wind-sim".into())
            .spawn(move || run(&capture, &shared))?;
        tracing::info!(rps_per_100s, angle_deg, "simulated anemometer started");
        Ok(Self {
            state,
            join_handle: Some(join_handle),
        })
    }

    pub fn set_rps(&self, rps_per_100s: f32) {
        self.state
            .rps_bits
            .store(rps_per_100s.to_bits(), Ordering::Relaxed);
    }

    pub fn set_angle_deg(&self, angle_deg: f32) {
        self.state
            .angle_bits
            .store(angle_deg.to_bits(), Ordering::Relaxed);
    }

    /// Completed revolutions (speed edges emitted).
    pub fn revolutions(&self) -> u64 {
        self.state.revolutions.load(Ordering::Relaxed)
    }
}

impl Drop for SimulatedAnemometer {
    fn drop(&mut self) {
        self.state.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(?e, "simulator thread panicked during shutdown");
        }
        tracing::debug!("simulated anemometer stopped");
    }
}

fn run<C: Clock>(capture: &EdgeCapture<C>, state: &SimState) {
    let clock = capture.clock();
    while !state.shutdown.load(Ordering::Relaxed) {
        let rps = f32::from_bits(state.rps_bits.load(Ordering::Relaxed));
        let Some(period_us) = revolution_period_us(rps) else {
            clock.sleep(SLEEP_SLICE);
            continue;
        };
        let angle = f32::from_bits(state.angle_bits.load(Ordering::Relaxed));
        let vane_at_us = (period_us as f64 * direction_fraction_for(angle, 0)) as u64;

        if !sleep_unless_stopped(clock, vane_at_us, state) {
            break;
        }
        let vane = capture.on_direction_edge(&true);
        if !sleep_unless_stopped(clock, period_us - vane_at_us, state) {
            break;
        }
        let speed = capture.on_speed_edge(&true);
        state.revolutions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(?vane, ?speed, period_us, vane_at_us, "simulated revolution");
    }
}

/// Sleep `us` in slices; false if a stop was requested meanwhile.
fn sleep_unless_stopped<C: Clock>(clock: &C, us: u64, state: &SimState) -> bool {
    let mut left = Duration::from_micros(us);
    while !left.is_zero() {
        if state.shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let slice = left.min(SLEEP_SLICE);
        clock.sleep(slice);
        left -= slice;
    }
    !state.shutdown.load(Ordering::Relaxed)
}
