//! Pulse counters shared between the compare-match ISR and the main loop.
//!
//! Each axis owns one [`AxisPulseState`], normally placed in a `static`.
//! Every access goes through a critical section so multi-byte counters are
//! never torn on 8-bit targets.

use core::cell::Cell;

use critical_section::Mutex;

/// Copy of an axis counter taken atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSnapshot {
    /// Compare matches counted since the axis was armed.
    pub count: u32,
    /// Compare matches after which the timer is stopped.
    pub target: u32,
    /// Timer clock is running.
    pub active: bool,
    /// A limit switch stopped the axis.
    pub faulted: bool,
}

impl PulseSnapshot {
    const IDLE: Self = Self {
        count: 0,
        target: 0,
        active: false,
        faulted: false,
    };

    /// The axis has stopped, either at its target or by fault.
    #[inline]
    pub const fn is_done(&self) -> bool {
        !self.active
    }

    /// Compare matches still to come.
    #[inline]
    pub const fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.count)
    }
}

/// Outcome of one compare match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseEvent {
    /// Counted, target not yet reached.
    Counting,
    /// This match completed the plan; the clock must stop now.
    TargetReached,
    /// The axis was not armed; nothing was counted.
    Ignored,
}

/// Per-axis pulse counter.
pub struct AxisPulseState {
    inner: Mutex<Cell<PulseSnapshot>>,
}

impl AxisPulseState {
    /// Create an idle counter.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(PulseSnapshot::IDLE)),
        }
    }

    /// Reset the count and arm for `target` matches.
    ///
    /// A zero target leaves the axis inactive. Clears a latched fault.
    pub fn arm(&self, target: u32) {
        self.update(|_| PulseSnapshot {
            count: 0,
            target,
            active: target > 0,
            faulted: false,
        });
    }

    /// Drop a latched fault without touching the count.
    pub fn clear_fault(&self) {
        self.update(|s| PulseSnapshot { faulted: false, ..s });
    }

    /// Mark the axis inactive, keeping the count and fault flag.
    pub fn disarm(&self) {
        self.update(|s| PulseSnapshot { active: false, ..s });
    }

    /// Latch a fault and deactivate the axis.
    pub fn fault(&self) {
        self.update(|s| PulseSnapshot {
            active: false,
            faulted: true,
            ..s
        });
    }

    /// Count one compare match.
    ///
    /// Only counts while active. Returns [`PulseEvent::TargetReached`]
    /// exactly once per arm.
    pub fn record_match(&self) -> PulseEvent {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut state = cell.get();

            if !state.active {
                return PulseEvent::Ignored;
            }

            state.count = state.count.saturating_add(1);
            let event = if state.count >= state.target {
                state.active = false;
                PulseEvent::TargetReached
            } else {
                PulseEvent::Counting
            };

            cell.set(state);
            event
        })
    }

    /// Read the counter atomically.
    pub fn snapshot(&self) -> PulseSnapshot {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// The axis has stopped.
    pub fn is_done(&self) -> bool {
        self.snapshot().is_done()
    }

    fn update(&self, f: impl FnOnce(PulseSnapshot) -> PulseSnapshot) {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            cell.set(f(cell.get()));
        });
    }
}

impl Default for AxisPulseState {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for AxisPulseState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AxisPulseState").field(&self.snapshot()).finish()
    }
}
