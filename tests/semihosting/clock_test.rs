/*!
 * Clock Calibration Tests
 * Origin tracking across dispatchers and sample orderings
 */

use super::common::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use semihost_relay::semihosting::{ClockCalibration, DirectBackend, HostConsole, SemihostingDispatcher, TimeValue};
use serial_test::serial;
use std::io::{empty, sink};
use std::sync::Arc;

fn shared_dispatcher() -> SemihostingDispatcher {
    let console = HostConsole::new(empty(), sink(), sink());
    SemihostingDispatcher::new(Box::new(DirectBackend::new(console)))
}

#[test]
#[serial]
fn test_dispatchers_share_the_process_origin() {
    let mut first = shared_dispatcher();
    let mut second = shared_dispatcher();
    let mut target = MockTarget::new();

    let a = call(&mut first, &mut target, SYS_CLOCK, [0; 4]);
    let b = call(&mut second, &mut target, SYS_CLOCK, [0; 4]);
    assert!(a >= 0 && b >= a);
    assert!(Arc::ptr_eq(first.clock_calibration(), second.clock_calibration()));
    assert!(ClockCalibration::shared().origin().is_some());
}

#[test]
#[serial]
fn test_shared_origin_never_rises() {
    let shared = ClockCalibration::shared();
    let mut dispatcher = shared_dispatcher();
    let mut target = MockTarget::new();

    call(&mut dispatcher, &mut target, SYS_CLOCK, [0; 4]);
    let origin = shared.origin().unwrap();
    call(&mut dispatcher, &mut target, SYS_CLOCK, [0; 4]);
    assert_eq!(shared.origin(), Some(origin));
}

#[test]
fn test_private_clock_starts_at_zero() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    let ticks = call(&mut harness.dispatcher, &mut target, SYS_CLOCK, [0; 4]);
    // The first sample becomes the origin, so only the sub-second part remains
    assert!((0..100).contains(&ticks), "{ticks}");
}

#[test]
fn test_earlier_sample_lowers_origin() {
    let clock = ClockCalibration::new();
    assert_eq!(clock.centiseconds(TimeValue::new(500, 0)), 0);
    assert_eq!(clock.centiseconds(TimeValue::new(400, 250_000)), 25);
    assert_eq!(clock.centiseconds(TimeValue::new(500, 0)), 10_000);
    assert_eq!(clock.origin(), Some(400));
}

proptest! {
    #[test]
    fn prop_elapsed_never_negative(samples in proptest::collection::vec((0u32..u32::MAX, 0u64..1_000_000), 1..32)) {
        let clock = ClockCalibration::new();
        let mut previous_origin = u32::MAX;
        for (seconds, micros) in samples {
            let ticks = clock.centiseconds(TimeValue::new(seconds, micros));
            prop_assert!(ticks >= 0);
            let origin = clock.origin().unwrap();
            prop_assert!(origin <= previous_origin);
            prop_assert!(origin <= seconds);
            previous_origin = origin;
        }
    }
}
