//! Sequencers
//!
//! A sequencer owns a node's operating state. Each tick it reads the
//! current inputs and the clock, advances its state, and records the
//! actions to apply and the notices for the operator in an [`Output`].
//!
//! Sequencers never sleep and never touch hardware.

pub mod plant;
pub mod visualizer;

use heapless::Vec;
use pltn_protocol::Message;

use crate::inputs::ControlInputs;
use crate::mode::PowerLevel;
use crate::state::{OperatingState, PumpStatus};
use crate::time::Instant;
use crate::traits::{Action, Actuators, Channel, DigitalOutput};

pub use plant::PlantSequencer;
pub use visualizer::Visualizer;

/// Maximum actions recorded per tick
pub const MAX_ACTIONS: usize = 32;

/// Maximum notices recorded per tick
pub const MAX_NOTICES: usize = 8;

/// Direction of a staged sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Startup,
    Shutdown,
}

/// Plant subsystem handled by one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Subsystem {
    SteamGenerator,
    Turbine,
    Condenser,
    CoolingTower,
}

impl Subsystem {
    /// Subsystems in stage order
    pub const ORDER: [Subsystem; 4] = [
        Subsystem::SteamGenerator,
        Subsystem::Turbine,
        Subsystem::Condenser,
        Subsystem::CoolingTower,
    ];

    /// Subsystem for a 1-based stage number
    pub fn for_step(step: u8) -> Option<Self> {
        let index = usize::from(step).checked_sub(1)?;
        Self::ORDER.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Subsystem::SteamGenerator => "steam generator",
            Subsystem::Turbine => "turbine",
            Subsystem::Condenser => "condenser",
            Subsystem::CoolingTower => "cooling tower",
        }
    }
}

/// Operator diagnostics produced by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    /// Plant state changed
    StateChanged {
        from: OperatingState,
        to: OperatingState,
    },
    /// A staged step executed
    Stage {
        phase: Phase,
        step: u8,
        total: u8,
        subsystem: Subsystem,
    },
    /// Power level changed while running
    LevelChanged { from: PowerLevel, to: PowerLevel },
    /// Over-power alarm armed or cleared
    Alarm { active: bool },
    /// Mirrored pump status changed
    StatusChanged { from: PumpStatus, to: PumpStatus },
    /// Visualizer LEDs cleared
    Blanked,
}

/// Actions and notices recorded during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    actions: Vec<Action, MAX_ACTIONS>,
    notices: Vec<Notice, MAX_NOTICES>,
}

impl Output {
    pub const fn new() -> Self {
        Self {
            actions: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Record an action; dropped if the tick is already full
    pub fn push(&mut self, action: Action) {
        let _ = self.actions.push(action);
    }

    pub fn set_level(&mut self, channel: Channel, percent: u8) {
        self.push(Action::SetLevel { channel, percent });
    }

    pub fn set_digital(&mut self, output: DigitalOutput, on: bool) {
        self.push(Action::SetDigital { output, on });
    }

    pub fn notice(&mut self, notice: Notice) {
        let _ = self.notices.push(notice);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Move the notices out, leaving none behind
    pub fn take_notices(&mut self) -> Vec<Notice, MAX_NOTICES> {
        core::mem::take(&mut self.notices)
    }

    /// Apply every recorded action in order
    pub fn apply_to<A: Actuators + ?Sized>(&self, actuators: &mut A) {
        actuators.apply_all(&self.actions);
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.notices.clear();
    }
}

/// Common interface of the node state machines
pub trait Sequencer {
    /// Inputs the sequencer reads
    type Inputs: ControlInputs;

    /// Operating state exposed for diagnostics
    type State: Copy + PartialEq;

    fn state(&self) -> Self::State;

    /// Advance one loop iteration
    fn tick(&mut self, inputs: &Self::Inputs, now: Instant, out: &mut Output);

    /// Actions that put every owned actuator in its off state
    fn safe_outputs(&self, out: &mut Output);

    /// Outbound status snapshot, or `None` if the node does not broadcast
    fn status(&self) -> Option<Message>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_for_step() {
        assert_eq!(Subsystem::for_step(0), None);
        assert_eq!(Subsystem::for_step(1), Some(Subsystem::SteamGenerator));
        assert_eq!(Subsystem::for_step(4), Some(Subsystem::CoolingTower));
        assert_eq!(Subsystem::for_step(5), None);
    }

    #[test]
    fn test_output_drops_past_capacity() {
        let mut out = Output::new();
        for _ in 0..MAX_ACTIONS + 4 {
            out.set_level(Channel::Turbine, 10);
        }
        assert_eq!(out.actions().len(), MAX_ACTIONS);
    }

    #[test]
    fn test_take_notices_empties() {
        let mut out = Output::new();
        out.notice(Notice::Blanked);
        assert_eq!(out.take_notices().len(), 1);
        assert!(out.notices().is_empty());
    }
}
