//! Full cycles driven by synthetic edges on a deterministic clock.
//!
//! Edges are injected through the same handlers the GPIO layer calls, so
//! each test exercises capture, snapshot, staleness guard, both
//! calculators and the published values together.

use std::sync::Arc;

use wind_core::mocks::RecordingSink;
use wind_core::util::deg_to_rad;
use wind_core::{
    DirectionBaseline, DirectionOutcome, EdgeCapture, INDETERMINATE_DEG, SpeedOutcome, TimingCfg,
    Tuning, WindDigitizer,
};
use wind_traits::clock::test_clock::TestClock;

const LOW: bool = true;

struct Rig {
    clock: TestClock,
    capture: Arc<EdgeCapture<TestClock>>,
    digitizer: WindDigitizer<TestClock>,
}

impl Rig {
    fn new(tuning: Tuning) -> Self {
        Self::with_baseline(tuning, DirectionBaseline::Accepted)
    }

    fn with_baseline(tuning: Tuning, baseline: DirectionBaseline) -> Self {
        let clock = TestClock::new();
        let timing = TimingCfg::default();
        let capture = Arc::new(EdgeCapture::new(clock.clone(), timing.debounce_us));
        let digitizer = WindDigitizer::builder()
            .with_capture(capture.clone())
            .with_timing(timing)
            .with_tuning(tuning)
            .with_direction_baseline(baseline)
            .build()
            .expect("valid digitizer");
        // First speed edge opens the first revolution.
        clock.advance_us(1_000_000);
        capture.on_speed_edge(&LOW);
        Self {
            clock,
            capture,
            digitizer,
        }
    }

    /// One anemometer revolution of `period_us` with the vane edge
    /// `vane_at_us` into it.
    fn revolution(&self, period_us: u64, vane_at_us: u64) {
        self.clock.advance_us(vane_at_us);
        self.capture.on_direction_edge(&LOW);
        self.clock.advance_us(period_us - vane_at_us);
        self.capture.on_speed_edge(&LOW);
    }

    /// One revolution without a vane edge.
    fn bare_revolution(&self, period_us: u64) {
        self.clock.advance_us(period_us);
        self.capture.on_speed_edge(&LOW);
    }
}

#[test]
fn step_from_calm_is_rejected_once_then_published() {
    let mut rig = Rig::new(Tuning::default());
    // 100 ms per revolution: rps 1000, 11.04 m/s; vane at 270 degrees
    rig.revolution(100_000, 25_000);

    let first = rig.digitizer.cycle();
    assert_eq!(
        first.speed,
        SpeedOutcome::Rejected {
            speed_cmps: 1104,
            deviation_cmps: 1104
        }
    );
    assert!(first.ignored_reading);
    assert_eq!(first.direction, DirectionOutcome::Skipped);
    assert_eq!(first.speed_out_cmps, 0);
    assert_eq!(rig.digitizer.baselines(), (1104, 0));

    let second = rig.digitizer.cycle();
    assert_eq!(second.speed, SpeedOutcome::Accepted { speed_cmps: 1104 });
    assert_eq!(second.rps, 1000);
    assert_eq!(second.apparent_wind().speed_mps, 11.0);
    // 270 degrees away from the initial baseline: outside the 18 degree window
    assert_eq!(
        second.direction,
        DirectionOutcome::Rejected {
            raw_deg: 270,
            deviation_deg: 270
        }
    );
    assert_eq!(second.filtered_direction_deg, 0);
}

#[test]
fn vane_near_north_is_filtered_towards_raw() {
    let mut rig = Rig::new(Tuning::default());
    rig.revolution(100_000, 97_000);
    rig.digitizer.cycle();

    let diag = rig.digitizer.cycle();
    assert_eq!(
        diag.direction,
        DirectionOutcome::Accepted {
            raw_deg: 11,
            filtered_deg: 3
        }
    );
    assert_eq!(diag.apparent_wind().angle_rad, deg_to_rad(3));

    for _ in 0..20 {
        rig.digitizer.cycle();
    }
    // Rounded steps of a quarter of the gap stop one degree short.
    assert_eq!(rig.digitizer.filtered_direction_deg(), 10);
}

#[test]
fn pulse_timeout_forces_no_wind_and_keeps_direction() {
    let mut rig = Rig::new(Tuning::new(1.0, 0));
    rig.revolution(100_000, 97_000);
    rig.digitizer.cycle();
    rig.digitizer.cycle();
    assert_eq!(rig.digitizer.speed_out_cmps(), 1104);
    assert_eq!(rig.digitizer.filtered_direction_deg(), 11);

    rig.clock.advance_us(1_500_000);
    let at_limit = rig.digitizer.cycle();
    assert!(!at_limit.stale);
    assert_eq!(at_limit.speed, SpeedOutcome::Accepted { speed_cmps: 1104 });

    rig.clock.advance_us(1);
    let stale = rig.digitizer.cycle();
    assert!(stale.stale);
    assert_eq!(stale.speed, SpeedOutcome::NoWind);
    assert_eq!(stale.direction, DirectionOutcome::Skipped);
    assert_eq!(stale.speed_out_cmps, 0);
    assert_eq!(stale.filtered_direction_deg, 11);
    assert_eq!(stale.apparent_wind().speed_mps, 0.0);
}

#[test]
fn vane_interval_longer_than_revolution_is_indeterminate() {
    let mut rig = Rig::new(Tuning::default());
    // rps 500 (5.94 m/s), vane at 90 degrees
    rig.revolution(200_000, 150_000);
    let slow = rig.digitizer.cycle();
    assert_eq!(slow.speed, SpeedOutcome::Accepted { speed_cmps: 594 });
    assert!(matches!(
        slow.direction,
        DirectionOutcome::Rejected { raw_deg: 90, .. }
    ));

    // Faster revolution with no vane edge: the stored 150 ms vane offset
    // now exceeds the 100 ms revolution.
    rig.bare_revolution(100_000);
    let fast = rig.digitizer.cycle();
    assert_eq!(fast.speed, SpeedOutcome::Accepted { speed_cmps: 1104 });
    assert_eq!(fast.direction, DirectionOutcome::Indeterminate);
    assert_eq!(fast.raw_direction_deg, INDETERMINATE_DEG);
    assert_eq!(fast.filtered_direction_deg, 0);
    assert_eq!(rig.digitizer.baselines().1, 0);
}

#[test]
fn live_tuning_applies_on_next_cycle() {
    let tuning = Tuning::new(1.0, 0);
    let mut rig = Rig::new(tuning.clone());
    rig.revolution(100_000, 97_000);
    rig.digitizer.cycle();
    rig.digitizer.cycle();
    assert_eq!(rig.digitizer.filtered_direction_deg(), 11);

    tuning.set_direction_offset_deg(-5);
    let shifted = rig.digitizer.cycle();
    assert_eq!(
        shifted.direction,
        DirectionOutcome::Accepted {
            raw_deg: 6,
            filtered_deg: 6
        }
    );

    tuning.set_filter_gain(0.5);
    tuning.set_direction_offset_deg(10);
    let halved = rig.digitizer.cycle();
    assert_eq!(halved.filter_gain, 0.5);
    assert_eq!(halved.direction_offset_deg, 10);
    assert_eq!(
        halved.direction,
        DirectionOutcome::Accepted {
            raw_deg: 21,
            filtered_deg: 14
        }
    );
}

#[test]
fn unchecked_live_gain_keeps_direction_on_the_circle() {
    let tuning = Tuning::new(1.0, 0);
    let mut rig = Rig::new(tuning.clone());
    rig.revolution(100_000, 97_000);
    rig.digitizer.cycle();
    tuning.set_filter_gain(1.0e12);
    let diag = rig.digitizer.cycle();
    assert!(matches!(
        diag.direction,
        DirectionOutcome::Accepted { raw_deg: 11, .. }
    ));
    assert!((0..360).contains(&diag.filtered_direction_deg));
    let angle = diag.apparent_wind().angle_rad;
    assert!((0.0..std::f32::consts::TAU).contains(&angle));
}

#[test]
fn computed_baseline_recovers_from_large_direction_step() {
    let mut rig = Rig::with_baseline(Tuning::default(), DirectionBaseline::Computed);
    rig.revolution(100_000, 25_000);
    rig.digitizer.cycle();
    let second = rig.digitizer.cycle();
    assert!(matches!(
        second.direction,
        DirectionOutcome::Rejected { raw_deg: 270, .. }
    ));
    assert_eq!(rig.digitizer.baselines().1, 270);

    let third = rig.digitizer.cycle();
    // Shortest way from 0 to 270 is -90; a quarter of that rounds to -23.
    assert_eq!(
        third.direction,
        DirectionOutcome::Accepted {
            raw_deg: 270,
            filtered_deg: 337
        }
    );
}

#[test]
fn accepted_baseline_stays_locked_on_large_direction_step() {
    let mut rig = Rig::new(Tuning::default());
    rig.revolution(100_000, 25_000);
    for _ in 0..5 {
        rig.digitizer.cycle();
    }
    assert_eq!(rig.digitizer.baselines(), (1104, 0));
    assert_eq!(rig.digitizer.filtered_direction_deg(), 0);
}

#[test]
fn every_step_publishes_once() {
    let mut rig = Rig::new(Tuning::default());
    let sink = RecordingSink::new();
    let mut out = sink.clone();
    rig.revolution(100_000, 97_000);
    for _ in 0..3 {
        rig.digitizer.step(&mut out);
    }
    rig.clock.advance_us(2_000_000);
    rig.digitizer.step(&mut out);

    let readings = sink.readings();
    assert_eq!(readings.len(), 4);
    assert_eq!(readings[0].speed_mps, 0.0);
    assert_eq!(readings[1].speed_mps, 11.0);
    assert_eq!(readings[3].speed_mps, 0.0);
    assert_eq!(sink.last(), Some(rig.digitizer.apparent_wind()));
}
