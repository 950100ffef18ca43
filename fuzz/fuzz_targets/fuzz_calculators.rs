#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use wind_core::direction::{DirectionCalculator, DirectionOutcome};
use wind_core::speed::SpeedCalculator;

#[derive(Debug, Arbitrary)]
struct Cycle {
    speed_interval_us: u64,
    direction_interval_us: u64,
    offset_deg: i32,
    gain_permille: u16,
}

fuzz_target!(|cycles: Vec<Cycle>| {
    let mut speed = SpeedCalculator::new();
    let mut direction = DirectionCalculator::new();
    for c in cycles {
        let outcome = speed.update(c.speed_interval_us);
        assert!(speed.output_cmps() >= 0);
        let Some(speed_cmps) = outcome.accepted_speed() else {
            continue;
        };
        let gain = f32::from(c.gain_permille.min(1000)) / 1000.0;
        let out = direction.update(
            c.direction_interval_us,
            c.speed_interval_us,
            speed_cmps,
            c.offset_deg,
            gain,
        );
        if let DirectionOutcome::Accepted { raw_deg, filtered_deg } = out {
            assert!((0..360).contains(&raw_deg));
            assert!((0..360).contains(&filtered_deg));
        }
    }
});
