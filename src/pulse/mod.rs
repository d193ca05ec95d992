//! Step pulse generation.
//!
//! Each axis runs a hardware timer in CTC mode whose compare-match output
//! drives the STEP line. The compare-match ISR counts matches in the axis'
//! [`AxisPulseState`] and stops the timer clock once the target is reached.

mod generator;
mod isr;
mod state;
mod timer;

pub use generator::{PulseChannel, PulseGenerator};
pub use isr::{on_compare_match, on_limit_switch};
pub use state::{AxisPulseState, PulseEvent, PulseSnapshot};
pub use timer::{CompareSetting, InterruptControl, StepTimer};
