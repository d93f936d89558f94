//! Power level derivation
//!
//! The power level is recomputed from the two rod positions on every tick,
//! whatever the operating state. Only the running plant acts on it.

use crate::config::Thresholds;

/// Ordinal plant output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerLevel {
    #[default]
    Off = 0,
    Normal = 1,
    Max = 2,
}

impl PowerLevel {
    /// Derive the level from rod positions
    ///
    /// Either rod below its minimum forces `Off`, regardless of the other.
    /// Both rods at or above their high marks give `Max`.
    pub fn derive(rod2: u32, rod3: u32, thresholds: &Thresholds) -> Self {
        if rod2 < thresholds.rod2_min || rod3 < thresholds.rod3_min {
            PowerLevel::Off
        } else if rod2 >= thresholds.rod2_high && rod3 >= thresholds.rod3_high {
            PowerLevel::Max
        } else {
            PowerLevel::Normal
        }
    }

    /// Wire code
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PowerLevel::Off),
            1 => Some(PowerLevel::Normal),
            2 => Some(PowerLevel::Max),
            _ => None,
        }
    }

    pub fn is_off(self) -> bool {
        self == PowerLevel::Off
    }
}
