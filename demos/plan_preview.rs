//! Example: Preview the timer settings of a pick-and-place route.
//!
//! This example demonstrates how to:
//! - Load the machine configuration from TOML
//! - Turn waypoints into speed-matched motion plans
//! - Look up the compare register setting each axis would run with
//!
//! Run with: `cargo run --example plan_preview -- demos/machine.toml`

use pnp_motion::{
    config::LimitPolicy,
    error::{Error, MotionError, Result},
    load_config, Axis, Direction, MachineConfig, Millimeters, MotionPlan, Point, Steps,
};

fn main() -> Result<()> {
    println!("=== Motion Plan Preview ===\n");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/demos/machine.toml").to_string());
    let config = load_config(&path)?;

    println!("Loaded {}", path);
    println!(
        "  timer: {} Hz, prescalers {:?}, {}..{} Hz",
        config.timer.clock_hz,
        config.timer.prescalers.as_slice(),
        config.timer.min_frequency.0,
        config.timer.max_frequency.0
    );
    for (axis, axis_config) in config.axes.iter() {
        println!(
            "  axis {}: {:.1} steps/mm, {:?} output{}",
            axis,
            axis_config.steps_per_mm(),
            axis_config.output,
            if axis_config.invert_direction { ", inverted" } else { "" }
        );
    }
    println!();

    // Home, a part, the drop-off bin and a target past the Y travel
    let route = [
        config.session.home,
        Point::new(180, 65),
        config.session.drop_off,
        Point::new(200, 450),
    ];

    let mut position = Point::default();
    for target in route {
        match preview(&config, position, target) {
            Ok(reached) => position = reached,
            Err(e) => println!("  skipped: {}\n", e),
        }
    }

    Ok(())
}

/// Print the plan for one leg and return the point actually reached.
fn preview(config: &MachineConfig, from: Point, to: Point) -> Result<Point> {
    println!("({}, {}) -> ({}, {})", from.x.0, from.y.0, to.x.0, to.y.0);

    let mut reached = to;
    let mut moves = Vec::new();
    for (axis, axis_config) in config.axes.iter() {
        let (start, target) = match axis {
            Axis::X => (from.x, to.x),
            Axis::Y => (from.y, to.y),
            Axis::Z => continue,
        };

        let target = match axis_config.travel {
            Some(travel) => travel.apply(target).ok_or(Error::Motion(MotionError::OutOfTravel {
                axis,
                target: target.0,
                max: travel.max.0,
            }))?,
            None => target,
        };
        if target != to_axis(to, axis) {
            let policy = axis_config.travel.map(|t| t.policy).unwrap_or(LimitPolicy::Reject);
            println!("  axis {} clamped to {} mm ({:?})", axis, target.0, policy);
            match axis {
                Axis::X => reached.x = target,
                _ => reached.y = target,
            }
        }

        let (from, to) = (axis_config.steps_at(start), axis_config.steps_at(target));
        let direction = Direction::from_delta(start.delta_to(target));
        moves.push((axis, direction, Steps(from.0.abs_diff(to.0))));
    }

    let plan = MotionPlan::synchronized(moves, config.motion.base_frequency, &config.timer);
    for entry in plan.iter() {
        let output = config.axes.get(entry.axis).map(|a| a.output).unwrap_or_default();
        match config.timer.compare_setting(entry.frequency, output) {
            Some(setting) => println!(
                "  axis {}: {:>6} steps {:?} at {:>5} Hz  (OCR {:>5}, /{})",
                entry.axis, entry.steps.0, entry.direction, entry.frequency.0, setting.compare, setting.prescaler
            ),
            None => println!("  axis {}: stationary", entry.axis),
        }
    }
    println!("  duration: {:.3} s\n", plan.duration_ns() as f64 / 1e9);

    Ok(reached)
}

fn to_axis(point: Point, axis: Axis) -> Millimeters {
    match axis {
        Axis::X => point.x,
        _ => point.y,
    }
}
