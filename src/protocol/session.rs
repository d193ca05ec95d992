//! Host protocol session.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{MachineConfig, MotionConfig, Point, SessionConfig};
use crate::error::{Error, Result, TransportError};
use crate::io::{EndEffector, Transport};
use crate::motion::{wait_for_idle, MotionControl};

use super::codes::{decode_coordinates, Command, Status, COORDINATE_PAYLOAD_LEN};
use super::table::{transition, Action, Event, State};

/// The firmware main loop: reads commands from the host, drives the gantry
/// and the end effector, and reports status bytes.
///
/// Every sequence blocks until finished; the host is not serviced while the
/// gantry moves. A diagnostic LED toggles on each completion poll.
pub struct ProtocolSession<TR, M, E, LED, D>
where
    TR: Transport,
    M: MotionControl,
    E: EndEffector,
    LED: OutputPin,
    D: DelayNs,
{
    transport: TR,
    motion: M,
    effector: E,
    led: LED,
    delay: D,
    config: SessionConfig,
    timing: MotionConfig,
    state: State,
    pending: Point,
    ready_waited_ms: u32,
}

impl<TR, M, E, LED, D> ProtocolSession<TR, M, E, LED, D>
where
    TR: Transport,
    M: MotionControl,
    E: EndEffector,
    LED: OutputPin,
    D: DelayNs,
{
    /// Create a session. Starts by homing when `session.home_on_boot` is set.
    pub fn new(transport: TR, motion: M, effector: E, led: LED, delay: D, config: &MachineConfig) -> Self {
        let state = if config.session.home_on_boot {
            State::Initialize
        } else {
            State::Waiting
        };

        Self {
            transport,
            motion,
            effector,
            led,
            delay,
            config: config.session,
            timing: config.motion,
            state,
            pending: Point::default(),
            ready_waited_ms: 0,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Last coordinates received with MOVE.
    #[inline]
    pub fn pending(&self) -> Point {
        self.pending
    }

    /// The motion backend.
    pub fn motion(&self) -> &M {
        &self.motion
    }

    /// The host link.
    pub fn transport(&self) -> &TR {
        &self.transport
    }

    /// Mutable access to the host link.
    pub fn transport_mut(&mut self) -> &mut TR {
        &mut self.transport
    }

    /// The end effector.
    pub fn effector(&self) -> &E {
        &self.effector
    }

    /// Take the session apart.
    pub fn into_parts(self) -> (TR, M, E, LED, D) {
        (self.transport, self.motion, self.effector, self.led, self.delay)
    }

    /// Run until the host disconnects.
    ///
    /// Waits for the host to connect, then processes input while the link is
    /// up. Only returns on error; a dropped link gives
    /// [`TransportError::Disconnected`] and needs a restart.
    pub fn run(&mut self) -> Result<()> {
        self.transport.init();

        while !self.transport.is_connected() {
            self.delay.delay_ms(self.config.connect_poll_ms);
        }
        info!("host connected");

        while self.transport.is_connected() {
            self.step()?;
        }

        warn!("host disconnected in {}", self.state);
        Err(TransportError::Disconnected.into())
    }

    /// Process one input event, including the outcome of any sequence it
    /// starts. Returns the state afterwards.
    ///
    /// A link failure abandons the sequence in progress: the session falls
    /// back to Waiting (Error stays latched) so the next step does not run it
    /// again.
    pub fn step(&mut self) -> Result<State> {
        let mut event = self.poll_event();
        loop {
            let action = self.apply(event);
            match self.perform(action) {
                Ok(Some(outcome)) => event = outcome,
                Ok(None) => return Ok(self.state),
                Err(e) => {
                    if self.state != State::Error {
                        warn!("link failure in {}, back to waiting", self.state);
                        self.state = State::Waiting;
                    }
                    return Err(e);
                }
            }
        }
    }

    fn poll_event(&mut self) -> Event {
        match self.state {
            State::Waiting | State::Error => match self.transport.rx_available() {
                0 => Event::Idle,
                1 => match self.transport.rx_char() {
                    Some(byte) => Command::try_from(byte).map_or(Event::Unknown(byte), Event::Command),
                    None => Event::Idle,
                },
                _ => Event::Burst,
            },
            State::Ready => match self.transport.rx_available() {
                COORDINATE_PAYLOAD_LEN => Event::Coordinates,
                1 => Event::Interrupted,
                n if n > COORDINATE_PAYLOAD_LEN => Event::Overrun,
                _ if self.ready_waited_ms >= self.config.ready_timeout_ms => Event::Timeout,
                _ => Event::Partial,
            },
            State::Move | State::Moving | State::Pick | State::Place | State::Pause | State::Initialize => {
                Event::Entered
            }
        }
    }

    fn apply(&mut self, event: Event) -> Action {
        match transition(self.state, event) {
            Some(t) => {
                if t.next != self.state {
                    trace!("{} -> {}", self.state, t.next);
                }
                self.state = t.next;
                t.action
            }
            None => {
                warn!("unexpected {} in {}", event, self.state);
                if self.state != State::Error {
                    self.state = State::Waiting;
                }
                Action::Flush
            }
        }
    }

    fn perform(&mut self, action: Action) -> Result<Option<Event>> {
        match action {
            Action::None => {}
            Action::Flush => self.transport.rx_flush(),
            Action::IdleDelay => {
                self.delay.delay_ms(self.config.ready_poll_ms);
                self.ready_waited_ms = self.ready_waited_ms.saturating_add(self.config.ready_poll_ms);
            }
            Action::AcknowledgeMove => {
                self.transport.rx_flush();
                self.ready_waited_ms = 0;
                self.send(Status::Ready)?;
            }
            Action::LoadCoordinates => self.load_coordinates(),
            Action::RunMove => {
                self.send(Status::Moving)?;
                let outcome = self.travel_to(self.pending);
                return self.finish(outcome, Status::Moved).map(Some);
            }
            Action::RunPick => {
                self.send(Status::Picking)?;
                let outcome = self.pick_sequence();
                return self.finish(outcome, Status::Picked).map(Some);
            }
            Action::RunPlace => {
                self.send(Status::Placing)?;
                let outcome = self.place_sequence();
                return self.finish(outcome, Status::Placed).map(Some);
            }
            Action::RunPause => {
                self.send(Status::Paused)?;
                return Ok(Some(Event::Done));
            }
            Action::RunInitialize => {
                self.send(Status::Initializing)?;
                self.motion.clear_faults();
                let outcome = self.travel_to(self.config.home);
                return self.finish(outcome, Status::Initialized).map(Some);
            }
            Action::ReportError => {
                self.transport.rx_flush();
                self.send(Status::Error)?;
            }
        }
        Ok(None)
    }

    fn send(&mut self, status: Status) -> Result<()> {
        trace!("tx {}", status);
        self.transport.tx_char(status.byte())?;
        Ok(())
    }

    fn load_coordinates(&mut self) {
        let mut payload = [0u8; COORDINATE_PAYLOAD_LEN];
        let mut len = 0;
        for slot in payload.iter_mut() {
            match self.transport.rx_char() {
                Some(byte) => {
                    *slot = byte;
                    len += 1;
                }
                None => break,
            }
        }

        match decode_coordinates(&payload[..len]) {
            Ok(point) => {
                debug!("coordinates ({}, {})", point.x.0, point.y.0);
                self.pending = point;
            }
            Err(_) => {
                warn!("short coordinate payload: {} bytes", len);
                self.transport.rx_flush();
                self.state = State::Waiting;
            }
        }
    }

    /// Report the outcome of a sequence. Link failures end the step; every
    /// other failure latches the error state.
    fn finish(&mut self, outcome: Result<()>, done: Status) -> Result<Event> {
        match outcome {
            Ok(()) => {
                self.send(done)?;
                Ok(Event::Done)
            }
            Err(Error::Transport(e)) => Err(e.into()),
            Err(Error::Motion(e)) => {
                error!("motion fault: {}", e);
                Ok(Event::Fault)
            }
            Err(Error::EndEffector(e)) => {
                error!("end effector fault: {}", e);
                Ok(Event::Fault)
            }
            Err(_) => Ok(Event::Fault),
        }
    }

    /// Move and block until the gantry stops, blinking the LED meanwhile.
    fn travel_to(&mut self, target: Point) -> Result<()> {
        self.motion.move_xy(target)?;

        let led = &mut self.led;
        let mut led_on = false;
        let waited = wait_for_idle(
            &mut self.motion,
            &mut self.delay,
            self.timing.poll_interval_ms,
            self.timing.move_timeout_ms,
            || {
                led_on = !led_on;
                let _ = if led_on { led.set_high() } else { led.set_low() };
            },
        );
        let _ = self.led.set_low();

        waited?;
        Ok(())
    }

    fn pick_sequence(&mut self) -> Result<()> {
        self.effector.lower()?;
        self.effector.grip()?;
        self.effector.lift()?;
        Ok(())
    }

    fn place_sequence(&mut self) -> Result<()> {
        self.travel_to(self.config.drop_off)?;
        self.effector.release()?;
        Ok(())
    }
}
