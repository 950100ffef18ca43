//! Sampler thread lifecycle: cycles are published while it runs and the
//! thread is joined on drop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use wind_core::mocks::{NullSink, RecordingSink};
use wind_core::sampler::Sampler;
use wind_core::{EdgeCapture, TimingCfg, WindDigitizer};
use wind_traits::Clock;
use wind_traits::clock::MonotonicClock;
use wind_traits::clock::test_clock::TestClock;

fn digitizer<C: Clock>(clock: C, period_ms: u64) -> WindDigitizer<C> {
    let timing = TimingCfg {
        period_ms,
        ..TimingCfg::default()
    };
    let capture = Arc::new(EdgeCapture::new(clock, timing.debounce_us));
    WindDigitizer::builder()
        .with_capture(capture)
        .with_timing(timing)
        .build()
        .expect("valid digitizer")
}

fn wait_for(mut cond: impl FnMut() -> bool, limit: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn sampler_publishes_every_cycle() {
    let sink = RecordingSink::new();
    let sampler = Sampler::spawn(digitizer(MonotonicClock::new(), 5), sink.clone());
    assert!(wait_for(|| sampler.ticks() >= 3, Duration::from_secs(2)));
    drop(sampler);

    let readings = sink.readings();
    assert!(readings.len() >= 3);
    // No edges were injected: calm throughout.
    assert!(readings.iter().all(|w| w.speed_mps == 0.0));
}

#[test]
fn wait_next_delivers_diagnostics() {
    let sampler = Sampler::spawn(digitizer(MonotonicClock::new(), 5), NullSink);
    let diag = sampler
        .wait_next(Duration::from_secs(1))
        .expect("a cycle within one second");
    assert_eq!(diag.speed_out_cmps, 0);
    assert!(!diag.ignored_reading);
}

#[test]
fn simulated_clock_sampler_runs_and_stops() {
    let clock = TestClock::new();
    let epoch = clock.now();
    let sampler = Sampler::spawn(digitizer(clock.clone(), 200), NullSink);
    assert!(wait_for(|| sampler.ticks() >= 10, Duration::from_secs(2)));
    drop(sampler);
    // TestClock sleeps by advancing, so at least ten periods have elapsed.
    assert!(clock.us_since(epoch) >= 200_000 * 9);
}

#[test]
fn multiple_samplers_dont_leak_threads() {
    for _ in 0..10 {
        let sampler = Sampler::spawn(digitizer(MonotonicClock::new(), 5), NullSink);
        std::thread::sleep(Duration::from_millis(10));
        let _ = sampler.latest();
        drop(sampler);
    }
}

#[test]
fn cycle_limit_stops_the_thread() {
    let sink = RecordingSink::new();
    let sampler = Sampler::spawn_with_limit(
        digitizer(MonotonicClock::new(), 5),
        sink.clone(),
        Some(4),
    );
    assert!(wait_for(|| sampler.is_finished(), Duration::from_secs(2)));
    assert_eq!(sampler.ticks(), 4);
    assert_eq!(sink.readings().len(), 4);
    // The last cycle's diagnostics are still there to collect.
    assert!(sampler.latest().is_some());
}

#[test]
fn zero_cycle_limit_publishes_nothing() {
    let sink = RecordingSink::new();
    let sampler = Sampler::spawn_with_limit(
        digitizer(MonotonicClock::new(), 5),
        sink.clone(),
        Some(0),
    );
    assert!(wait_for(|| sampler.is_finished(), Duration::from_secs(2)));
    assert_eq!(sampler.ticks(), 0);
    assert!(sink.readings().is_empty());
    assert!(sampler.latest().is_none());
}
