//! Vacuum end effector.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::EffectorConfig;
use crate::error::EndEffectorError;

/// The tool at the gantry tip.
pub trait EndEffector {
    /// Drive the tool down onto the part.
    fn lower(&mut self) -> Result<(), EndEffectorError>;

    /// Start the vacuum and wait for it to hold.
    fn grip(&mut self) -> Result<(), EndEffectorError>;

    /// Drive the tool back up.
    fn lift(&mut self) -> Result<(), EndEffectorError>;

    /// Drop the part.
    fn release(&mut self) -> Result<(), EndEffectorError>;
}

impl<E: EndEffector + ?Sized> EndEffector for &mut E {
    fn lower(&mut self) -> Result<(), EndEffectorError> {
        (**self).lower()
    }

    fn grip(&mut self) -> Result<(), EndEffectorError> {
        (**self).grip()
    }

    fn lift(&mut self) -> Result<(), EndEffectorError> {
        (**self).lift()
    }

    fn release(&mut self) -> Result<(), EndEffectorError> {
        (**self).release()
    }
}

/// End effector on plain GPIO: an H-bridge moving the tool up and down, a
/// vacuum pump and a vent solenoid.
pub struct GpioEndEffector<PIN, D>
where
    PIN: OutputPin,
    D: DelayNs,
{
    bridge_in1: PIN,
    bridge_in2: PIN,
    bridge_enable: PIN,
    pump: PIN,
    vent: PIN,
    delay: D,
    timing: EffectorConfig,
}

impl<PIN, D> GpioEndEffector<PIN, D>
where
    PIN: OutputPin,
    D: DelayNs,
{
    /// Create the driver. Pins are assumed low (everything off).
    pub fn new(
        bridge_in1: PIN,
        bridge_in2: PIN,
        bridge_enable: PIN,
        pump: PIN,
        vent: PIN,
        delay: D,
        timing: EffectorConfig,
    ) -> Self {
        Self {
            bridge_in1,
            bridge_in2,
            bridge_enable,
            pump,
            vent,
            delay,
            timing,
        }
    }

    /// Release the pins.
    pub fn release_pins(self) -> (PIN, PIN, PIN, PIN, PIN) {
        (self.bridge_in1, self.bridge_in2, self.bridge_enable, self.pump, self.vent)
    }

    /// Run the bridge in one direction for the configured travel time.
    fn travel(&mut self, down: bool) -> Result<(), EndEffectorError> {
        set(&mut self.bridge_in1, down)?;
        set(&mut self.bridge_in2, !down)?;
        set(&mut self.bridge_enable, true)?;
        self.delay.delay_ms(self.timing.travel_ms);
        set(&mut self.bridge_enable, false)?;
        set(&mut self.bridge_in1, false)?;
        set(&mut self.bridge_in2, false)
    }
}

fn set<PIN: OutputPin>(pin: &mut PIN, high: bool) -> Result<(), EndEffectorError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| EndEffectorError::Pin)
}

impl<PIN, D> EndEffector for GpioEndEffector<PIN, D>
where
    PIN: OutputPin,
    D: DelayNs,
{
    fn lower(&mut self) -> Result<(), EndEffectorError> {
        self.travel(true)
    }

    fn grip(&mut self) -> Result<(), EndEffectorError> {
        set(&mut self.pump, true)?;
        self.delay.delay_ms(self.timing.grip_settle_ms);
        Ok(())
    }

    fn lift(&mut self) -> Result<(), EndEffectorError> {
        self.travel(false)
    }

    fn release(&mut self) -> Result<(), EndEffectorError> {
        set(&mut self.pump, false)?;
        set(&mut self.vent, true)?;
        self.delay.delay_ms(self.timing.release_ms);
        set(&mut self.vent, false)
    }
}
