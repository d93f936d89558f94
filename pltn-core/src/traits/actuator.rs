//! Actuator interface
//!
//! Sequencers never touch outputs directly. They emit [`Action`]s which the
//! node loop hands to an [`Actuators`] implementation in one batch.

/// Variable-level output (motor speed or LED brightness)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Steam generator blower
    SteamFan,
    /// Turbine motor
    Turbine,
    /// Condenser circulation pump
    CondenserPump,
    /// Cooling tower fan
    CoolingTowerFan,
    /// One LED of a visualizer bar
    Led(u8),
}

impl Channel {
    /// Plant motors in stage order
    pub const MOTORS: [Channel; 4] = [
        Channel::SteamFan,
        Channel::Turbine,
        Channel::CondenserPump,
        Channel::CoolingTowerFan,
    ];
}

/// On/off output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitalOutput {
    SteamHumidifier1,
    SteamHumidifier2,
    CondenserHumidifier,
    CoolingTowerHumidifier1,
    CoolingTowerHumidifier2,
    /// Over-power alarm
    Buzzer,
}

impl DigitalOutput {
    /// Every humidifier relay
    pub const HUMIDIFIERS: [DigitalOutput; 5] = [
        DigitalOutput::SteamHumidifier1,
        DigitalOutput::SteamHumidifier2,
        DigitalOutput::CondenserHumidifier,
        DigitalOutput::CoolingTowerHumidifier1,
        DigitalOutput::CoolingTowerHumidifier2,
    ];
}

/// A single actuation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Drive a channel to a level in percent (0-100)
    SetLevel { channel: Channel, percent: u8 },
    /// Switch a digital output
    SetDigital { output: DigitalOutput, on: bool },
}

/// Output bank driven by a node
///
/// Implementations clamp levels above 100 and ignore channels they do not
/// own. Hardware faults are swallowed; actuation is fail-silent.
pub trait Actuators {
    /// Drive a variable-level channel (percent 0-100)
    fn set_level(&mut self, channel: Channel, percent: u8);

    /// Switch a digital output
    fn set_digital(&mut self, output: DigitalOutput, on: bool);

    fn apply(&mut self, action: &Action) {
        match *action {
            Action::SetLevel { channel, percent } => self.set_level(channel, percent),
            Action::SetDigital { output, on } => self.set_digital(output, on),
        }
    }

    /// Apply a batch in order
    fn apply_all(&mut self, actions: &[Action]) {
        for action in actions {
            self.apply(action);
        }
    }
}

impl<T: Actuators + ?Sized> Actuators for &mut T {
    fn set_level(&mut self, channel: Channel, percent: u8) {
        (**self).set_level(channel, percent);
    }

    fn set_digital(&mut self, output: DigitalOutput, on: bool) {
        (**self).set_digital(output, on);
    }
}
