//! Events that trigger plant state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Derived power level rose above off
    PowerRequested,
    /// Derived power level fell back to off
    PowerLost,
    /// Final startup stage executed
    StartupComplete,
    /// Final shutdown stage executed
    ShutdownComplete,
}
