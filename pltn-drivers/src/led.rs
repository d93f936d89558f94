//! Bar of PWM-dimmed LEDs

use embedded_hal::pwm::SetDutyCycle;
use pltn_core::traits::{Actuators, Channel, DigitalOutput};

/// `N` LEDs addressed as `Channel::Led(0..N)`
pub struct LedBar<P, const N: usize> {
    leds: [P; N],
    levels: [u8; N],
    faults: u32,
}

impl<P: SetDutyCycle, const N: usize> LedBar<P, N> {
    /// Take ownership of the channels and switch every LED off
    pub fn new(leds: [P; N]) -> Self {
        let mut bar = Self {
            leds,
            levels: [0; N],
            faults: 0,
        };
        bar.clear();
        bar
    }

    /// Set one LED's brightness in percent; out-of-range indices are ignored
    pub fn set(&mut self, index: usize, percent: u8) {
        let percent = percent.min(100);
        let Some(led) = self.leds.get_mut(index) else {
            return;
        };
        if led.set_duty_cycle_percent(percent).is_err() {
            self.faults = self.faults.saturating_add(1);
        }
        self.levels[index] = percent;
    }

    pub fn clear(&mut self) {
        for index in 0..N {
            self.set(index, 0);
        }
    }

    pub fn levels(&self) -> &[u8; N] {
        &self.levels
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }
}

impl<P: SetDutyCycle, const N: usize> Actuators for LedBar<P, N> {
    fn set_level(&mut self, channel: Channel, percent: u8) {
        if let Channel::Led(index) = channel {
            self.set(usize::from(index), percent);
        }
    }

    // A bar has no digital outputs
    fn set_digital(&mut self, _output: DigitalOutput, _on: bool) {}
}
