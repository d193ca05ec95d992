//! Example: A complete host session against a simulated gantry.
//!
//! This example demonstrates how to:
//! - Wire a `MotionCoordinator` from configuration and per-axis timers
//! - Service compare-match interrupts with `on_compare_match`
//! - Drive a `ProtocolSession` from a scripted host
//!
//! Timers are simulated: every delay advances a virtual clock and raises the
//! compare matches that would have fired meanwhile.
//!
//! Run with: `cargo run --example bench_session`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use pnp_motion::{
    error::{EndEffectorError, Error, Result, TransportError},
    protocol::encode_coordinates,
    pulse::{on_compare_match, AxisPulseState, InterruptControl, StepTimer},
    Command, EndEffector, MachineConfig, MotionCoordinator, Point, ProtocolSession, Status, Transport,
};

static X_PULSES: AxisPulseState = AxisPulseState::new();
static Y_PULSES: AxisPulseState = AxisPulseState::new();

// =============================================================================
// Simulated hardware
// =============================================================================

#[derive(Default)]
struct TimerRegs {
    compare: u16,
    prescaler: Option<u16>,
    phase: u64,
}

/// One timer channel; the ISR runs from `BenchDelay`.
#[derive(Clone, Default)]
struct BenchTimer(Rc<RefCell<TimerRegs>>);

impl StepTimer for BenchTimer {
    fn set_compare(&mut self, compare: u16) {
        self.0.borrow_mut().compare = compare;
    }

    fn start(&mut self, prescaler: u16) {
        let mut regs = self.0.borrow_mut();
        regs.prescaler = Some(prescaler);
        regs.phase = 0;
    }

    fn stop(&mut self) {
        self.0.borrow_mut().prescaler = None;
    }

    fn enable_interrupt(&mut self) {}

    fn disable_interrupt(&mut self) {}
}

struct NoIrq;

impl InterruptControl for NoIrq {
    fn enable(&mut self) {}
}

/// Delay that advances every channel by the elapsed timer ticks.
#[derive(Clone)]
struct BenchDelay {
    clock_hz: u64,
    channels: Rc<Vec<(&'static AxisPulseState, BenchTimer)>>,
}

impl DelayNs for BenchDelay {
    fn delay_ns(&mut self, ns: u32) {
        let ticks = ns as u64 * self.clock_hz / 1_000_000_000;
        for (state, timer) in self.channels.iter() {
            let mut timer = timer.clone();
            let mut budget = ticks;
            loop {
                let fired = {
                    let mut regs = timer.0.borrow_mut();
                    let Some(prescaler) = regs.prescaler else { break };
                    let period = (prescaler as u64 * (regs.compare as u64 + 1)).max(1);
                    if regs.phase + budget < period {
                        regs.phase += budget;
                        false
                    } else {
                        budget -= period - regs.phase;
                        regs.phase = 0;
                        true
                    }
                };
                if !fired {
                    break;
                }
                on_compare_match(state, &mut timer);
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_ns(1_000_000);
        }
    }
}

#[derive(Clone, Default)]
struct Pin(Rc<RefCell<bool>>);

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        *self.0.borrow_mut() = false;
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        *self.0.borrow_mut() = true;
        Ok(())
    }
}

struct PrintingEffector;

impl EndEffector for PrintingEffector {
    fn lower(&mut self) -> core::result::Result<(), EndEffectorError> {
        println!("    effector: lower");
        Ok(())
    }

    fn grip(&mut self) -> core::result::Result<(), EndEffectorError> {
        println!("    effector: vacuum on");
        Ok(())
    }

    fn lift(&mut self) -> core::result::Result<(), EndEffectorError> {
        println!("    effector: lift");
        Ok(())
    }

    fn release(&mut self) -> core::result::Result<(), EndEffectorError> {
        println!("    effector: vent");
        Ok(())
    }
}

/// Host that sends one request after each expected reply.
struct ScriptedHost {
    requests: RefCell<VecDeque<(Vec<u8>, Option<Status>)>>,
    awaiting: RefCell<Option<Status>>,
    rx: RefCell<VecDeque<u8>>,
}

impl ScriptedHost {
    fn new(requests: Vec<(Vec<u8>, Option<Status>)>) -> Self {
        Self {
            requests: RefCell::new(requests.into()),
            awaiting: RefCell::new(None),
            rx: RefCell::new(VecDeque::new()),
        }
    }
}

impl Transport for ScriptedHost {
    fn is_connected(&self) -> bool {
        if self.awaiting.borrow().is_none() && self.rx.borrow().is_empty() {
            match self.requests.borrow_mut().pop_front() {
                Some((bytes, reply)) => {
                    println!("host  -> {:02X?}", bytes);
                    self.rx.borrow_mut().extend(bytes);
                    *self.awaiting.borrow_mut() = reply;
                }
                None => return false,
            }
        }
        true
    }

    fn rx_available(&self) -> usize {
        self.rx.borrow().len()
    }

    fn rx_char(&mut self) -> Option<u8> {
        self.rx.get_mut().pop_front()
    }

    fn rx_flush(&mut self) {
        self.rx.get_mut().clear();
    }

    fn tx_char(&mut self, byte: u8) -> core::result::Result<(), TransportError> {
        let status = Status::try_from(byte).map_err(|_| TransportError::Write(byte))?;
        println!("host <-  {:02X} {:?}", byte, status);
        let awaiting = self.awaiting.get_mut();
        if *awaiting == Some(status) || status == Status::Error {
            *awaiting = None;
        }
        Ok(())
    }
}

// =============================================================================
// Session
// =============================================================================

fn main() -> Result<()> {
    println!("=== Simulated Bench Session ===\n");

    let config = MachineConfig::default();

    let x_timer = BenchTimer::default();
    let y_timer = BenchTimer::default();
    let delay = BenchDelay {
        clock_hz: config.timer.clock_hz as u64,
        channels: Rc::new(vec![(&X_PULSES, x_timer.clone()), (&Y_PULSES, y_timer.clone())]),
    };

    let motion = MotionCoordinator::builder()
        .from_config(&config)
        .axis(pnp_motion::Axis::X, x_timer, &X_PULSES, Pin::default(), Pin::default())
        .axis(pnp_motion::Axis::Y, y_timer, &Y_PULSES, Pin::default(), Pin::default())
        .interrupts(NoIrq)
        .delay(delay.clone())
        .build()?;

    // A MOVE sends its payload once READY arrives
    let part = Point::new(120, 75);
    let host = ScriptedHost::new(vec![
        (vec![Command::Move.byte()], Some(Status::Ready)),
        (encode_coordinates(part).to_vec(), Some(Status::Moved)),
        (vec![Command::Pick.byte()], Some(Status::Picked)),
        (vec![Command::IsFinished.byte()], None),
        (vec![Command::Place.byte()], Some(Status::Placed)),
        (vec![Command::Pause.byte()], Some(Status::Paused)),
    ]);

    let mut session = ProtocolSession::new(host, motion, PrintingEffector, Pin::default(), delay, &config);

    match session.run() {
        Err(Error::Transport(TransportError::Disconnected)) => {
            let at = session.motion().current_point();
            println!("\nHost disconnected; gantry at ({}, {})", at.x.0, at.y.0);
            Ok(())
        }
        other => other,
    }
}
