//! Plant state machine definition

use super::events::Event;

/// Plant operating states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingState {
    /// Everything off, waiting for the rods to be withdrawn
    #[default]
    Idle,
    /// Bringing subsystems up one stage per window
    StartingUp,
    /// Steady state, profile follows the power level
    Running,
    /// Bringing subsystems down one stage per window
    ShuttingDown,
}

impl OperatingState {
    /// Staged states advance on the sequence window
    pub fn is_staging(&self) -> bool {
        matches!(self, OperatingState::StartingUp | OperatingState::ShuttingDown)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use OperatingState::*;

        match (self, event) {
            (Idle, PowerRequested) => StartingUp,

            // Aborting a startup goes through the shutdown stages too
            (StartingUp, PowerLost) => ShuttingDown,
            (StartingUp, StartupComplete) => Running,

            (Running, PowerLost) => ShuttingDown,

            // A shutdown always runs to completion
            (ShuttingDown, ShutdownComplete) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let state = OperatingState::Idle
            .transition(Event::PowerRequested)
            .transition(Event::StartupComplete);
        assert_eq!(state, OperatingState::Running);

        let state = state
            .transition(Event::PowerLost)
            .transition(Event::ShutdownComplete);
        assert_eq!(state, OperatingState::Idle);
    }

    #[test]
    fn test_abort_startup() {
        let state = OperatingState::StartingUp.transition(Event::PowerLost);
        assert_eq!(state, OperatingState::ShuttingDown);
    }

    #[test]
    fn test_shutdown_ignores_power_request() {
        let state = OperatingState::ShuttingDown.transition(Event::PowerRequested);
        assert_eq!(state, OperatingState::ShuttingDown);
    }

    #[test]
    fn test_idle_cannot_jump_to_running() {
        assert_eq!(
            OperatingState::Idle.transition(Event::StartupComplete),
            OperatingState::Idle
        );
    }

    #[test]
    fn test_staging_states() {
        assert!(OperatingState::StartingUp.is_staging());
        assert!(OperatingState::ShuttingDown.is_staging());
        assert!(!OperatingState::Idle.is_staging());
        assert!(!OperatingState::Running.is_staging());
    }
}
