//! Simulated bench shared by the integration tests.
//!
//! `Bench` owns a virtual clock. Every delay advances it, and every running
//! step timer produces compare matches at `prescaler * (compare + 1)` ticks,
//! delivered to `on_compare_match` exactly as the hardware ISR would.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use pnp_motion::error::{EndEffectorError, TransportError};
use pnp_motion::pulse::{on_compare_match, on_limit_switch, AxisPulseState, InterruptControl, StepTimer};
use pnp_motion::{Axis, EndEffector, MachineConfig, MotionCoordinator, Transport};

// =============================================================================
// Timers
// =============================================================================

/// Registers of one simulated step timer.
#[derive(Debug, Default)]
pub struct Regs {
    pub compare: u16,
    pub prescaler: Option<u16>,
    pub irq: bool,
    phase: u64,
    /// Compare matches (STEP edges) since the last start.
    pub edges: u32,
    /// Timer ticks elapsed since the last start, up to the stop.
    pub run_ticks: u64,
    pub starts: u32,
}

/// Handle given to the pulse generator.
#[derive(Clone)]
pub struct SimTimer(Rc<RefCell<Regs>>);

impl SimTimer {
    pub fn running(&self) -> bool {
        self.0.borrow().prescaler.is_some()
    }
}

impl StepTimer for SimTimer {
    fn set_compare(&mut self, compare: u16) {
        self.0.borrow_mut().compare = compare;
    }

    fn start(&mut self, prescaler: u16) {
        let mut regs = self.0.borrow_mut();
        regs.prescaler = Some(prescaler);
        regs.phase = 0;
        regs.edges = 0;
        regs.run_ticks = 0;
        regs.starts += 1;
    }

    fn stop(&mut self) {
        self.0.borrow_mut().prescaler = None;
    }

    fn enable_interrupt(&mut self) {
        self.0.borrow_mut().irq = true;
    }

    fn disable_interrupt(&mut self) {
        self.0.borrow_mut().irq = false;
    }
}

struct Channel {
    axis: Axis,
    state: &'static AxisPulseState,
    regs: Rc<RefCell<Regs>>,
}

struct Clock {
    clock_hz: u64,
    now_ns: u64,
    carry: u64,
    interrupts: bool,
}

/// Virtual clock plus every attached timer channel.
#[derive(Clone)]
pub struct Bench {
    clock: Rc<RefCell<Clock>>,
    channels: Rc<RefCell<Vec<Channel>>>,
    /// Limit switches due to close once the clock passes their deadline.
    trips: Rc<RefCell<Vec<(Axis, u64)>>>,
}

impl Bench {
    pub fn new(clock_hz: u32) -> Self {
        Self {
            clock: Rc::new(RefCell::new(Clock {
                clock_hz: clock_hz as u64,
                now_ns: 0,
                carry: 0,
                interrupts: false,
            })),
            channels: Rc::new(RefCell::new(Vec::new())),
            trips: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Add a timer channel for `axis` with its own leaked pulse state.
    pub fn attach(&self, axis: Axis) -> (SimTimer, &'static AxisPulseState) {
        let state: &'static AxisPulseState = Box::leak(Box::new(AxisPulseState::new()));
        let regs = Rc::new(RefCell::new(Regs::default()));
        self.channels.borrow_mut().push(Channel {
            axis,
            state,
            regs: regs.clone(),
        });
        (SimTimer(regs), state)
    }

    pub fn irq(&self) -> SimIrq {
        SimIrq(self.clone())
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay(self.clone())
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ns / 1_000_000
    }

    fn regs(&self, axis: Axis) -> Rc<RefCell<Regs>> {
        self.channels
            .borrow()
            .iter()
            .find(|c| c.axis == axis)
            .map(|c| c.regs.clone())
            .expect("axis not attached")
    }

    /// STEP edges produced by `axis` since its timer last started.
    pub fn edges(&self, axis: Axis) -> u32 {
        self.regs(axis).borrow().edges
    }

    /// Time `axis` ran for since its timer last started, in nanoseconds.
    pub fn run_time_ns(&self, axis: Axis) -> u64 {
        let ticks = self.regs(axis).borrow().run_ticks;
        ticks * 1_000_000_000 / self.clock.borrow().clock_hz
    }

    pub fn running(&self, axis: Axis) -> bool {
        self.regs(axis).borrow().prescaler.is_some()
    }

    pub fn compare(&self, axis: Axis) -> (u16, Option<u16>) {
        let regs = self.regs(axis);
        let regs = regs.borrow();
        (regs.compare, regs.prescaler)
    }

    /// Fire the limit switch of `axis`.
    pub fn trip_limit(&self, axis: Axis) {
        let (state, regs) = self.channel(axis);
        on_limit_switch(state, &mut SimTimer(regs));
    }

    /// Fire the limit switch of `axis` once `ms` more have elapsed.
    pub fn trip_after(&self, axis: Axis, ms: u64) {
        let deadline = self.clock.borrow().now_ns + ms * 1_000_000;
        self.trips.borrow_mut().push((axis, deadline));
    }

    /// Stop the clock of `axis` without the ISR noticing.
    pub fn stall(&self, axis: Axis) {
        self.regs(axis).borrow_mut().prescaler = None;
    }

    fn channel(&self, axis: Axis) -> (&'static AxisPulseState, Rc<RefCell<Regs>>) {
        self.channels
            .borrow()
            .iter()
            .find(|c| c.axis == axis)
            .map(|c| (c.state, c.regs.clone()))
            .expect("axis not attached")
    }

    fn advance(&self, ns: u64) {
        let (ticks, interrupts) = {
            let mut clock = self.clock.borrow_mut();
            clock.now_ns += ns;
            let total = ns * clock.clock_hz + clock.carry;
            clock.carry = total % 1_000_000_000;
            (total / 1_000_000_000, clock.interrupts)
        };
        if ticks == 0 {
            return;
        }

        let channels: Vec<_> = self
            .channels
            .borrow()
            .iter()
            .map(|c| (c.state, c.regs.clone()))
            .collect();
        for (state, regs) in channels {
            run_channel(state, regs, ticks, interrupts);
        }

        let now = self.clock.borrow().now_ns;
        let due: Vec<Axis> = {
            let mut trips = self.trips.borrow_mut();
            let due = trips.iter().filter(|(_, at)| *at <= now).map(|(axis, _)| *axis).collect();
            trips.retain(|(_, at)| *at > now);
            due
        };
        for axis in due {
            self.trip_limit(axis);
        }
    }
}

fn run_channel(state: &'static AxisPulseState, regs: Rc<RefCell<Regs>>, ticks: u64, interrupts: bool) {
    let mut timer = SimTimer(regs.clone());
    let mut budget = ticks;
    loop {
        let deliver = {
            let mut r = regs.borrow_mut();
            let Some(prescaler) = r.prescaler else { return };
            let period = (prescaler as u64 * (r.compare as u64 + 1)).max(1);
            let to_next = period - r.phase.min(period - 1);
            if budget < to_next {
                r.phase += budget;
                r.run_ticks += budget;
                return;
            }
            budget -= to_next;
            r.run_ticks += to_next;
            r.phase = 0;
            r.edges += 1;
            r.irq && interrupts
        };
        if deliver {
            on_compare_match(state, &mut timer);
        }
    }
}

/// Global interrupt enable.
pub struct SimIrq(Bench);

impl InterruptControl for SimIrq {
    fn enable(&mut self) {
        self.0.clock.borrow_mut().interrupts = true;
    }
}

/// Delay that advances the bench clock.
#[derive(Clone)]
pub struct SimDelay(Bench);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance(ns as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.0.advance(us as u64 * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.advance(ms as u64 * 1_000_000);
    }
}

// =============================================================================
// Pins
// =============================================================================

/// Output pin whose level can be read back.
#[derive(Clone, Default)]
pub struct SimPin(Rc<Cell<bool>>);

impl SimPin {
    pub fn is_high(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

/// Pins of one axis, kept for inspection.
#[derive(Clone, Default)]
pub struct AxisPins {
    pub dir: SimPin,
    pub enable: SimPin,
}

pub type SimCoordinator = MotionCoordinator<'static, SimTimer, SimIrq, SimPin, SimDelay>;

/// A coordinator wired to `bench` for every axis in `config`.
pub fn coordinator(bench: &Bench, config: &MachineConfig) -> (SimCoordinator, Vec<(Axis, AxisPins)>) {
    let mut builder = MotionCoordinator::builder().from_config(config);
    let mut pins = Vec::new();
    for (axis, _) in config.axes.iter() {
        let (timer, state) = bench.attach(axis);
        let p = AxisPins::default();
        builder = builder.axis(axis, timer, state, p.dir.clone(), p.enable.clone());
        pins.push((axis, p));
    }
    let coordinator = builder
        .interrupts(bench.irq())
        .delay(bench.delay())
        .build()
        .expect("bench coordinator");
    (coordinator, pins)
}

// =============================================================================
// Host link
// =============================================================================

/// One step of a host script.
#[derive(Debug, Clone)]
pub enum Script {
    /// Put bytes on the wire once the receive buffer is empty.
    Send(Vec<u8>),
    /// Wait until the firmware has transmitted this byte.
    Expect(u8),
}

/// Host that replays a script and disconnects when it runs out.
#[derive(Default)]
pub struct ScriptedHost {
    rx: RefCell<VecDeque<u8>>,
    script: RefCell<VecDeque<Script>>,
    cursor: Cell<usize>,
    scripted: bool,
    pub tx: Vec<u8>,
    pub flushes: u32,
    pub initialized: bool,
}

impl ScriptedHost {
    /// A host that stays connected; feed it with [`ScriptedHost::send`].
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn scripted(script: impl IntoIterator<Item = Script>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            scripted: true,
            ..Self::default()
        }
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.rx.get_mut().extend(bytes.iter().copied());
    }

    pub fn pending(&self) -> usize {
        self.rx.borrow().len()
    }

    /// Drain and return everything transmitted so far.
    pub fn take_tx(&mut self) -> Vec<u8> {
        self.cursor.set(0);
        std::mem::take(&mut self.tx)
    }

    fn advance_script(&self) {
        let mut script = self.script.borrow_mut();
        while let Some(step) = script.front() {
            match step {
                Script::Send(bytes) => {
                    let mut rx = self.rx.borrow_mut();
                    if !rx.is_empty() {
                        return;
                    }
                    rx.extend(bytes.iter().copied());
                    script.pop_front();
                    return;
                }
                Script::Expect(byte) => {
                    let seen = self.tx[self.cursor.get()..].iter().position(|b| b == byte);
                    match seen {
                        Some(at) => {
                            self.cursor.set(self.cursor.get() + at + 1);
                            script.pop_front();
                        }
                        None => return,
                    }
                }
            }
        }
    }
}

impl Transport for ScriptedHost {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn is_connected(&self) -> bool {
        if !self.scripted {
            return true;
        }
        self.advance_script();
        !(self.script.borrow().is_empty() && self.rx.borrow().is_empty())
    }

    fn rx_available(&self) -> usize {
        self.rx.borrow().len()
    }

    fn rx_char(&mut self) -> Option<u8> {
        self.rx.get_mut().pop_front()
    }

    fn rx_flush(&mut self) {
        self.flushes += 1;
        self.rx.get_mut().clear();
    }

    fn tx_char(&mut self, byte: u8) -> Result<(), TransportError> {
        self.tx.push(byte);
        Ok(())
    }
}

// =============================================================================
// End effector
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Lower,
    Grip,
    Lift,
    Release,
}

/// Effector that records its strokes and can be told to fail one.
#[derive(Default)]
pub struct RecordingEffector {
    pub strokes: Vec<Stroke>,
    pub fail_on: Option<Stroke>,
}

impl RecordingEffector {
    fn stroke(&mut self, stroke: Stroke) -> Result<(), EndEffectorError> {
        self.strokes.push(stroke);
        if self.fail_on == Some(stroke) {
            Err(EndEffectorError::Pin)
        } else {
            Ok(())
        }
    }
}

impl EndEffector for RecordingEffector {
    fn lower(&mut self) -> Result<(), EndEffectorError> {
        self.stroke(Stroke::Lower)
    }

    fn grip(&mut self) -> Result<(), EndEffectorError> {
        self.stroke(Stroke::Grip)
    }

    fn lift(&mut self) -> Result<(), EndEffectorError> {
        self.stroke(Stroke::Lift)
    }

    fn release(&mut self) -> Result<(), EndEffectorError> {
        self.stroke(Stroke::Release)
    }
}
