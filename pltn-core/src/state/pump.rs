//! Pump status mirrored by visualizer nodes

/// Pump status as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PumpStatus {
    #[default]
    Off = 0,
    Starting = 1,
    On = 2,
    ShuttingDown = 3,
}

impl PumpStatus {
    /// Decode a wire code; unknown codes yield `None`
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PumpStatus::Off),
            1 => Some(PumpStatus::Starting),
            2 => Some(PumpStatus::On),
            3 => Some(PumpStatus::ShuttingDown),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}
