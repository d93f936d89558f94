//! Control inputs extracted from received messages
//!
//! Each node keeps only the fields it cares about. Inputs change only when
//! a complete message has been parsed, and a field missing from a message
//! keeps its previous value. A silent link therefore freezes the inputs.
//!
//! Inputs read the payload pair by pair, so unknown keys never crowd out
//! the fields a node watches.

use pltn_protocol::{pairs, Key, KEY_ROD2, KEY_ROD3};

use crate::state::PumpStatus;

/// Node-specific view of received messages
pub trait ControlInputs {
    /// Fold a decoded payload (markers stripped) into the inputs
    ///
    /// Returns true if any field of interest was present.
    fn absorb(&mut self, payload: &[u8]) -> bool;
}

/// Control rod positions read by the generation node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RodPositions {
    pub rod2: u32,
    pub rod3: u32,
}

impl RodPositions {
    pub const fn new(rod2: u32, rod3: u32) -> Self {
        Self { rod2, rod3 }
    }
}

impl ControlInputs for RodPositions {
    fn absorb(&mut self, payload: &[u8]) -> bool {
        let mut seen = false;
        for (key, value) in pairs(payload) {
            match key {
                KEY_ROD2 => self.rod2 = value,
                KEY_ROD3 => self.rod3 = value,
                _ => continue,
            }
            seen = true;
        }
        seen
    }
}

/// A single pump status read from a configured key
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PumpInput {
    key: Key,
    status: PumpStatus,
}

impl PumpInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            status: PumpStatus::Off,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> PumpStatus {
        self.status
    }
}

impl ControlInputs for PumpInput {
    fn absorb(&mut self, payload: &[u8]) -> bool {
        let mut seen = false;
        for (_, code) in pairs(payload).filter(|(key, _)| *key == self.key.as_str()) {
            // Unknown codes leave the last status in place
            if let Some(status) = PumpStatus::from_code(code) {
                self.status = status;
            }
            seen = true;
        }
        seen
    }
}
