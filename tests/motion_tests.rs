//! Moves run end to end on the simulated bench.

mod common;

use proptest::prelude::*;

use common::{coordinator, Bench};
use pnp_motion::config::{OutputMode, TimerConfig};
use pnp_motion::error::MotionError;
use pnp_motion::pulse::CompareSetting;
use pnp_motion::{wait_for_idle, Axis, Direction, Hertz, MachineConfig, MotionPlan, MotionStatus, Point, Steps};

const CLOCK_HZ: u32 = 16_000_000;

fn two_axis_plan(x: u32, y: u32, base: Hertz, timer: &TimerConfig) -> MotionPlan {
    MotionPlan::synchronized(
        [
            (Axis::X, Direction::Forward, Steps(x)),
            (Axis::Y, Direction::Forward, Steps(y)),
        ],
        base,
        timer,
    )
}

// =============================================================================
// Compare register arithmetic
// =============================================================================

proptest! {
    #[test]
    fn prop_compare_setting_within_half_percent(frequency in 100u32..=30_000, pulse in any::<bool>()) {
        let timer = TimerConfig::default();
        let output = if pulse { OutputMode::Pulse } else { OutputMode::Toggle };

        let setting = timer.compare_setting(Hertz(frequency), output).unwrap();
        let actual = setting.step_frequency(CLOCK_HZ, output.matches_per_step());
        let error = (actual - frequency as f32).abs() / frequency as f32;

        prop_assert!(error <= 0.005, "{} Hz -> {} Hz ({:?})", frequency, actual, setting);
    }

    #[test]
    fn prop_smallest_prescaler_is_chosen(frequency in 100u32..=30_000) {
        let timer = TimerConfig::default();
        let setting = timer.compare_setting(Hertz(frequency), OutputMode::Toggle).unwrap();

        for &smaller in timer.prescalers.iter().take_while(|&&p| p < setting.prescaler) {
            let fits = CompareSetting::for_frequency(CLOCK_HZ, &[smaller], u16::MAX, Hertz(frequency), 2);
            prop_assert!(fits.is_none());
        }
    }
}

// =============================================================================
// Speed matching
// =============================================================================

proptest! {
    #[test]
    fn prop_speed_matching(x in 0u32..200_000, y in 0u32..200_000, base in 100u32..=30_000) {
        let timer = TimerConfig::default();
        let plan = two_axis_plan(x, y, Hertz(base), &timer);
        let longest = x.max(y);

        for entry in plan.iter() {
            let steps = entry.steps.0 as u64;
            let f = entry.frequency.0 as u64;

            if steps == 0 {
                prop_assert_eq!(f, 0);
            } else if steps == longest as u64 {
                prop_assert_eq!(f, base as u64);
            } else if f == 0 {
                // Slowed below the minimum
                prop_assert!((base as u64 * steps / longest as u64) < timer.min_frequency.0 as u64);
            } else {
                let scaled = base as u64 * steps;
                prop_assert!(f * longest as u64 <= scaled);
                prop_assert!(scaled < (f + 1) * longest as u64);
            }
        }
    }
}

#[test]
fn test_base_frequency_policy_applies_to_longest_axis() {
    let timer = TimerConfig::default();

    let plan = two_axis_plan(1000, 10, Hertz(50_000), &timer);
    assert_eq!(plan.get(Axis::X).unwrap().frequency, Hertz(30_000));
    assert_eq!(plan.get(Axis::Y).unwrap().frequency, Hertz(300));

    let plan = two_axis_plan(1000, 500, Hertz(99), &timer);
    assert!(plan.is_stationary());
}

// =============================================================================
// Simulated moves
// =============================================================================

#[test]
fn test_move_runs_to_completion() {
    let config = MachineConfig::default();
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, pins) = coordinator(&bench, &config);
    let mut delay = bench.delay();

    let plan = motion.move_xy(Point::new(50, 20)).unwrap();
    assert_eq!(plan.get(Axis::X).unwrap().steps, Steps(6250));
    assert_eq!(plan.get(Axis::Y).unwrap().steps, Steps(2500));
    assert_eq!(plan.get(Axis::Y).unwrap().frequency, Hertz(4000));

    for (_, p) in &pins {
        assert!(!p.enable.is_high(), "drivers enabled (active-low)");
        assert!(p.dir.is_high());
    }

    let waited = wait_for_idle(&mut motion, &mut delay, 50, 120_000, || {}).unwrap();
    assert_eq!(waited, 650);

    // Toggle mode: two edges per step
    assert_eq!(bench.edges(Axis::X), 12_500);
    assert_eq!(bench.edges(Axis::Y), 5_000);
    assert!(!bench.running(Axis::X));
    assert!(!bench.running(Axis::Y));

    // Both axes stop within one step of the slower axis
    let x_ns = bench.run_time_ns(Axis::X);
    let y_ns = bench.run_time_ns(Axis::Y);
    assert!(x_ns.abs_diff(y_ns) < 250_000, "x {} ns, y {} ns", x_ns, y_ns);

    assert_eq!(motion.status(), MotionStatus::Idle);
    assert_eq!(motion.current_point(), Point::new(50, 20));
}

#[test]
fn test_stationary_axis_stays_off() {
    let config = MachineConfig::default();
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, _pins) = coordinator(&bench, &config);
    let mut delay = bench.delay();

    motion.move_xy(Point::new(8, 0)).unwrap();
    assert!(!bench.running(Axis::Y));
    assert_eq!(bench.compare(Axis::Y), (0, None));

    wait_for_idle(&mut motion, &mut delay, 50, 1_000, || {}).unwrap();
    // 8 mm at 125 steps/mm, two edges per step
    assert_eq!(bench.edges(Axis::X), 2_000);
    assert_eq!(bench.edges(Axis::Y), 0);
}

#[test]
fn test_return_trip_reverses_direction() {
    let config = MachineConfig::default();
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, pins) = coordinator(&bench, &config);
    let mut delay = bench.delay();

    motion.move_xy(Point::new(30, 30)).unwrap();
    wait_for_idle(&mut motion, &mut delay, 50, 120_000, || {}).unwrap();

    let plan = motion.move_xy(Point::new(10, 30)).unwrap();
    let x = plan.get(Axis::X).unwrap();
    assert_eq!(x.direction, Direction::Reverse);
    assert_eq!(x.steps, Steps(2500));
    assert!(plan.get(Axis::Y).unwrap().is_stationary());

    let (_, x_pins) = &pins[0];
    assert!(!x_pins.dir.is_high());

    wait_for_idle(&mut motion, &mut delay, 50, 120_000, || {}).unwrap();
    assert_eq!(bench.edges(Axis::X), 5_000);
    assert_eq!(motion.current_point(), Point::new(10, 30));
}

#[test]
fn test_new_move_while_busy_is_rejected() {
    let config = MachineConfig::default();
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, _pins) = coordinator(&bench, &config);

    motion.move_xy(Point::new(100, 0)).unwrap();
    assert_eq!(motion.status(), MotionStatus::Moving);

    assert_eq!(motion.move_xy(Point::new(0, 0)), Err(MotionError::Busy(Axis::X)));
    // Rejected move leaves the commanded position alone
    assert_eq!(motion.current_point(), Point::new(100, 0));
}

#[test]
fn test_limit_switch_stops_move() {
    let config = MachineConfig::default();
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, _pins) = coordinator(&bench, &config);
    let mut delay = bench.delay();

    motion.move_xy(Point::new(100, 100)).unwrap();
    let mut polls = 0;
    let result = wait_for_idle(&mut motion, &mut delay, 50, 120_000, || {
        polls += 1;
        if polls == 3 {
            bench.trip_limit(Axis::Y);
        }
    });

    assert_eq!(result, Err(MotionError::LimitSwitch(Axis::Y)));
    assert!(!bench.running(Axis::X), "every axis halted");
    assert!(!bench.running(Axis::Y));
    assert!(bench.edges(Axis::Y) < 2 * 12_500);

    // Latched: moves are refused until the fault is cleared
    assert_eq!(motion.status(), MotionStatus::Faulted(Axis::Y));
    assert_eq!(motion.move_xy(Point::new(0, 0)), Err(MotionError::LimitSwitch(Axis::Y)));
    assert!(!bench.running(Axis::X));

    motion.clear_faults();
    motion.move_xy(Point::new(0, 0)).unwrap();
    assert_eq!(motion.status(), MotionStatus::Moving);
}

#[test]
fn test_limit_tripped_while_idle_blocks_next_move() {
    let config = MachineConfig::default();
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, _pins) = coordinator(&bench, &config);

    bench.trip_limit(Axis::X);

    assert_eq!(motion.move_xy(Point::new(20, 0)), Err(MotionError::LimitSwitch(Axis::X)));
    assert!(!bench.running(Axis::X));
    assert_eq!(bench.edges(Axis::X), 0);
    assert_eq!(motion.current_point(), Point::new(0, 0));
}

#[test]
fn test_fractional_pitch_does_not_drift() {
    let mut config = MachineConfig::default();
    config.axes.x.pulses_per_revolution = 800;
    config.axes.x.lead_screw_pitch = 3.0;
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, _pins) = coordinator(&bench, &config);
    let mut delay = bench.delay();

    let mut edges = 0;
    for mm in 1..=30 {
        motion.move_xy(Point::new(mm, 0)).unwrap();
        wait_for_idle(&mut motion, &mut delay, 5, 120_000, || {}).unwrap();
        edges += bench.edges(Axis::X);
    }

    // 30 mm at 800 steps per 3 mm, toggle output
    assert_eq!(edges, 2 * 8_000);
}

#[test]
fn test_stalled_axis_times_out() {
    let config = MachineConfig::default();
    let bench = Bench::new(CLOCK_HZ);
    let (mut motion, _pins) = coordinator(&bench, &config);
    let mut delay = bench.delay();

    motion.move_xy(Point::new(20, 20)).unwrap();
    bench.stall(Axis::X);

    let result = wait_for_idle(&mut motion, &mut delay, 50, 2_000, || {});
    assert_eq!(result, Err(MotionError::Timeout { elapsed_ms: 2_000 }));
    assert_eq!(motion.status(), MotionStatus::Idle);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_position_tracks_completed_moves(
        targets in prop::collection::vec((0u16..=120, 0u16..=120), 1..4)
    ) {
        let config = MachineConfig::default();
        let bench = Bench::new(CLOCK_HZ);
        let (mut motion, _pins) = coordinator(&bench, &config);
        let mut delay = bench.delay();
        let x_config = config.axes.x.clone();

        for (x, y) in targets {
            let before = motion.current_point();
            let target = Point::new(x, y);
            motion.move_xy(target).unwrap();
            wait_for_idle(&mut motion, &mut delay, 50, 120_000, || {}).unwrap();

            prop_assert_eq!(motion.current_point(), target);

            let x_steps = x_config.steps_at(before.x).0.abs_diff(x_config.steps_at(target.x).0);
            if x_steps > 0 {
                prop_assert_eq!(bench.edges(Axis::X), x_steps * 2);
            }
        }
    }
}
