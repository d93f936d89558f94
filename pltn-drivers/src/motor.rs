//! Fixed-direction DC motor on a PWM channel
//!
//! Speed is a percentage mapped linearly onto the channel's duty range.
//! There is no ramping: the sequencer's staged windows pace the plant.

use embedded_hal::pwm::SetDutyCycle;

/// PWM-driven motor
pub struct PwmMotor<P> {
    pwm: P,
    /// Speed last requested (0-100%)
    speed: u8,
    faults: u32,
}

impl<P: SetDutyCycle> PwmMotor<P> {
    /// Wrap a PWM channel and stop the motor
    pub fn new(pwm: P) -> Self {
        let mut motor = Self {
            pwm,
            speed: 0,
            faults: 0,
        };
        motor.stop();
        motor
    }

    /// Set the speed in percent; values above 100 are clamped
    pub fn set_speed(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.speed = percent;
        if self.pwm.set_duty_cycle_percent(percent).is_err() {
            self.faults = self.faults.saturating_add(1);
        }
    }

    pub fn stop(&mut self) {
        self.set_speed(0);
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.speed > 0
    }

    /// PWM writes that failed
    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakePwm;

    #[test]
    fn test_starts_stopped() {
        let motor = PwmMotor::new(FakePwm {
            duty: 700,
            broken: false,
        });
        assert_eq!(motor.speed(), 0);
        assert_eq!(motor.pwm().duty, 0);
    }

    #[test]
    fn test_percent_maps_to_duty() {
        let mut motor = PwmMotor::new(FakePwm::default());
        motor.set_speed(50);
        assert_eq!(motor.pwm().duty, 500);
        motor.set_speed(100);
        assert_eq!(motor.pwm().duty, 1000);
        assert!(motor.is_running());
    }

    #[test]
    fn test_stop_zeroes_duty() {
        let mut motor = PwmMotor::new(FakePwm::default());
        motor.set_speed(60);
        motor.stop();
        assert_eq!(motor.speed(), 0);
        assert_eq!(motor.pwm().duty, 0);
        assert!(!motor.is_running());
    }

    #[test]
    fn test_speed_clamped() {
        let mut motor = PwmMotor::new(FakePwm::default());
        motor.set_speed(250);
        assert_eq!(motor.speed(), 100);
        assert_eq!(motor.pwm().duty, 1000);
    }

    #[test]
    fn test_fault_counted() {
        let mut motor = PwmMotor::new(FakePwm {
            duty: 0,
            broken: true,
        });
        motor.set_speed(40);
        assert_eq!(motor.speed(), 40);
        assert_eq!(motor.faults(), 2);
    }
}
