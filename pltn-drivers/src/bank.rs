//! Generation node output bank
//!
//! Four motors, five humidifier relays and the alarm buzzer, addressed
//! through the core actuator channels.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use pltn_core::traits::{Actuators, Channel, DigitalOutput};

use crate::motor::PwmMotor;
use crate::relay::{Polarity, Relay};

/// Every output of the generation node
pub struct PlantActuators<M, R, B> {
    pub steam_fan: PwmMotor<M>,
    pub turbine: PwmMotor<M>,
    pub condenser_pump: PwmMotor<M>,
    pub cooling_tower_fan: PwmMotor<M>,
    /// Humidifier relays in [`DigitalOutput::HUMIDIFIERS`] order
    pub humidifiers: [Relay<R>; 5],
    pub buzzer: Relay<B>,
}

impl<M, R, B> PlantActuators<M, R, B>
where
    M: SetDutyCycle,
    R: OutputPin,
    B: OutputPin,
{
    /// Build the bank with everything off
    ///
    /// `motors` are in stage order (steam fan, turbine, condenser pump,
    /// cooling tower fan). The buzzer is driven active-high.
    pub fn new(
        motors: [M; 4],
        humidifiers: [R; 5],
        buzzer: B,
        relay_polarity: Polarity,
    ) -> Self {
        let [steam_fan, turbine, condenser_pump, cooling_tower_fan] =
            motors.map(PwmMotor::new);
        Self {
            steam_fan,
            turbine,
            condenser_pump,
            cooling_tower_fan,
            humidifiers: humidifiers.map(|pin| Relay::new(pin, relay_polarity)),
            buzzer: Relay::active_high(buzzer),
        }
    }

    fn motor_mut(&mut self, channel: Channel) -> Option<&mut PwmMotor<M>> {
        match channel {
            Channel::SteamFan => Some(&mut self.steam_fan),
            Channel::Turbine => Some(&mut self.turbine),
            Channel::CondenserPump => Some(&mut self.condenser_pump),
            Channel::CoolingTowerFan => Some(&mut self.cooling_tower_fan),
            Channel::Led(_) => None,
        }
    }

    /// Speed of a motor channel, `None` for channels the bank does not own
    pub fn speed(&self, channel: Channel) -> Option<u8> {
        match channel {
            Channel::SteamFan => Some(self.steam_fan.speed()),
            Channel::Turbine => Some(self.turbine.speed()),
            Channel::CondenserPump => Some(self.condenser_pump.speed()),
            Channel::CoolingTowerFan => Some(self.cooling_tower_fan.speed()),
            Channel::Led(_) => None,
        }
    }

    pub fn is_on(&self, output: DigitalOutput) -> bool {
        match humidifier_index(output) {
            Some(index) => self.humidifiers[index].is_on(),
            None => self.buzzer.is_on(),
        }
    }

    /// Failed hardware writes across the bank
    pub fn faults(&self) -> u32 {
        let motors = [
            &self.steam_fan,
            &self.turbine,
            &self.condenser_pump,
            &self.cooling_tower_fan,
        ]
        .iter()
        .map(|m| m.faults())
        .fold(0u32, u32::saturating_add);
        let relays = self
            .humidifiers
            .iter()
            .map(Relay::faults)
            .fold(0u32, u32::saturating_add);
        motors
            .saturating_add(relays)
            .saturating_add(self.buzzer.faults())
    }
}

fn humidifier_index(output: DigitalOutput) -> Option<usize> {
    DigitalOutput::HUMIDIFIERS.iter().position(|&h| h == output)
}

impl<M, R, B> Actuators for PlantActuators<M, R, B>
where
    M: SetDutyCycle,
    R: OutputPin,
    B: OutputPin,
{
    fn set_level(&mut self, channel: Channel, percent: u8) {
        if let Some(motor) = self.motor_mut(channel) {
            motor.set_speed(percent);
        }
    }

    fn set_digital(&mut self, output: DigitalOutput, on: bool) {
        match humidifier_index(output) {
            Some(index) => self.humidifiers[index].set(on),
            None => self.buzzer.set(on),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakePin, FakePwm};

    type Bank = PlantActuators<FakePwm, FakePin, FakePin>;

    fn bank() -> Bank {
        PlantActuators::new(
            core::array::from_fn(|_| FakePwm::default()),
            core::array::from_fn(|_| FakePin::default()),
            FakePin::default(),
            Polarity::ActiveLow,
        )
    }

    #[test]
    fn test_boots_all_off() {
        let bank = bank();
        for channel in Channel::MOTORS {
            assert_eq!(bank.speed(channel), Some(0));
        }
        // Active-low relays idle high
        assert!(bank.humidifiers.iter().all(|r| r.pin().high));
        assert!(!bank.buzzer.pin().high);
    }

    #[test]
    fn test_routes_channels() {
        let mut bank = bank();
        bank.set_level(Channel::CondenserPump, 60);
        bank.set_digital(DigitalOutput::CoolingTowerHumidifier2, true);
        bank.set_digital(DigitalOutput::Buzzer, true);

        assert_eq!(bank.speed(Channel::CondenserPump), Some(60));
        assert_eq!(bank.condenser_pump.pwm().duty, 600);
        assert!(bank.is_on(DigitalOutput::CoolingTowerHumidifier2));
        assert!(!bank.humidifiers[4].pin().high);
        assert!(bank.is_on(DigitalOutput::Buzzer));
        assert!(bank.buzzer.pin().high);
    }

    #[test]
    fn test_led_channels_ignored() {
        let mut bank = bank();
        bank.set_level(Channel::Led(0), 100);
        assert_eq!(bank.speed(Channel::Led(0)), None);
        assert_eq!(bank.faults(), 0);
    }

    #[test]
    fn test_broken_motor_counted() {
        let mut bank = bank();
        bank.turbine = PwmMotor::new(FakePwm {
            duty: 0,
            broken: true,
        });
        bank.set_level(Channel::Turbine, 40);
        assert_eq!(bank.speed(Channel::Turbine), Some(40));
        assert_eq!(bank.faults(), 2);
    }
}
