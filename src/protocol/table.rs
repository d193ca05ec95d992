//! Protocol state transition table.
//!
//! `(state, event) -> (next state, action)`. Every combination not listed is
//! a protocol violation: the session flushes its input and returns to
//! [`State::Waiting`] ([`State::Error`] stays latched).

use super::codes::Command;

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Idle, reading one command byte at a time.
    Waiting,
    /// MOVE received; READY not yet sent.
    Move,
    /// READY sent; waiting for the coordinate payload.
    Ready,
    /// Running a move.
    Moving,
    /// Running the pick sequence.
    Pick,
    /// Running the place sequence.
    Place,
    /// Acknowledging a pause.
    Pause,
    /// Homing.
    Initialize,
    /// Latched fault.
    Error,
}

/// Input to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A single known command byte was read.
    Command(Command),
    /// A single byte that is not a command was read.
    Unknown(u8),
    /// More than one byte arrived while a single command was expected.
    Burst,
    /// Nothing received.
    Idle,
    /// Exactly the coordinate payload is buffered.
    Coordinates,
    /// A single byte arrived instead of the payload.
    Interrupted,
    /// Part of the payload is buffered (or none of it yet).
    Partial,
    /// More bytes than the payload are buffered.
    Overrun,
    /// The payload did not arrive in time.
    Timeout,
    /// A state was just entered.
    Entered,
    /// The state's sequence finished.
    Done,
    /// The state's sequence failed.
    Fault,
}

/// Side effect performed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Nothing.
    None,
    /// Discard buffered input.
    Flush,
    /// Sleep one payload poll interval.
    IdleDelay,
    /// Flush stale input and send READY.
    AcknowledgeMove,
    /// Read and decode the coordinate payload.
    LoadCoordinates,
    /// MOVING, move, wait, MOVED.
    RunMove,
    /// PICKING, lower, grip, lift, PICKED.
    RunPick,
    /// PLACING, move to drop-off, wait, release, PLACED.
    RunPlace,
    /// PAUSED.
    RunPause,
    /// INITIALIZING, move home, wait, INITIALIZED.
    RunInitialize,
    /// Send ERROR and discard buffered input.
    ReportError,
}

/// Table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// State after the event.
    pub next: State,
    /// Side effect to perform.
    pub action: Action,
}

const fn to(next: State, action: Action) -> Option<Transition> {
    Some(Transition { next, action })
}

/// Look up the transition for `event` in `state`.
pub fn transition(state: State, event: Event) -> Option<Transition> {
    use Action as A;
    use State as S;

    match (state, event) {
        (S::Waiting, Event::Idle) => to(S::Waiting, A::None),
        (S::Waiting, Event::Burst) => to(S::Waiting, A::Flush),
        (S::Waiting, Event::Command(command)) => to(dispatch(command), A::None),

        (S::Move, Event::Entered) => to(S::Ready, A::AcknowledgeMove),

        (S::Ready, Event::Coordinates) => to(S::Moving, A::LoadCoordinates),
        (S::Ready, Event::Interrupted) => to(S::Waiting, A::None),
        (S::Ready, Event::Partial) => to(S::Ready, A::IdleDelay),
        (S::Ready, Event::Overrun) => to(S::Waiting, A::Flush),
        (S::Ready, Event::Timeout) => to(S::Waiting, A::Flush),

        (S::Moving, Event::Entered) => to(S::Moving, A::RunMove),
        (S::Pick, Event::Entered) => to(S::Pick, A::RunPick),
        (S::Place, Event::Entered) => to(S::Place, A::RunPlace),
        (S::Pause, Event::Entered) => to(S::Pause, A::RunPause),
        (S::Initialize, Event::Entered) => to(S::Initialize, A::RunInitialize),

        (S::Moving | S::Pick | S::Place | S::Pause | S::Initialize, Event::Done) => to(S::Waiting, A::None),
        (S::Moving | S::Pick | S::Place | S::Initialize, Event::Fault) => to(S::Error, A::ReportError),

        (S::Error, Event::Idle) => to(S::Error, A::None),
        (S::Error, Event::Burst) => to(S::Error, A::Flush),
        (S::Error, Event::Command(Command::Initialize)) => to(S::Initialize, A::None),
        (S::Error, Event::Command(_)) => to(S::Error, A::ReportError),

        _ => None,
    }
}

/// State a command byte read in [`State::Waiting`] leads to.
fn dispatch(command: Command) -> State {
    match command {
        Command::Move => State::Move,
        Command::Pick => State::Pick,
        Command::Place => State::Place,
        Command::Pause => State::Pause,
        Command::Initialize => State::Initialize,
        // Moves block until complete, so there is never anything to report
        Command::IsFinished => State::Waiting,
    }
}
