//! Relay (or any on/off load) on a GPIO pin

use embedded_hal::digital::OutputPin;

/// Pin level that energises the load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    #[default]
    ActiveHigh,
    /// On = pin low (typical opto-isolated relay boards)
    ActiveLow,
}

impl Polarity {
    pub fn from_active_low(active_low: bool) -> Self {
        if active_low {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }

    /// Pin level for a logical state
    fn level(self, on: bool) -> bool {
        on != (self == Polarity::ActiveLow)
    }
}

/// On/off output with polarity handling
pub struct Relay<P> {
    pin: P,
    polarity: Polarity,
    /// Logical state last requested
    on: bool,
    faults: u32,
}

impl<P: OutputPin> Relay<P> {
    /// Wrap a pin and switch the load off
    pub fn new(pin: P, polarity: Polarity) -> Self {
        let mut relay = Self {
            pin,
            polarity,
            on: false,
            faults: 0,
        };
        relay.set(false);
        relay
    }

    pub fn active_high(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveHigh)
    }

    pub fn active_low(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveLow)
    }

    /// Switch the load; pin errors are counted, not returned
    pub fn set(&mut self, on: bool) {
        self.on = on;
        let result = if self.polarity.level(on) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            self.faults = self.faults.saturating_add(1);
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Pin writes that failed
    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{BrokenPin, FakePin};

    #[test]
    fn test_starts_off_active_high() {
        let relay = Relay::active_high(FakePin { high: true, writes: 0 });
        assert!(!relay.is_on());
        assert!(!relay.pin().high);
    }

    #[test]
    fn test_starts_off_active_low() {
        let relay = Relay::active_low(FakePin::default());
        assert!(!relay.is_on());
        assert!(relay.pin().high);
    }

    #[test]
    fn test_active_low_on_drives_low() {
        let mut relay = Relay::new(FakePin::default(), Polarity::from_active_low(true));
        relay.set(true);
        assert!(relay.is_on());
        assert!(!relay.pin().high);

        relay.set(false);
        assert!(relay.pin().high);
    }

    #[test]
    fn test_faults_counted_state_kept() {
        let mut relay = Relay::active_high(BrokenPin);
        relay.set(true);
        assert!(relay.is_on());
        // One from construction, one from set
        assert_eq!(relay.faults(), 2);
    }
}
