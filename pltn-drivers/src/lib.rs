//! Output drivers for PLTN simulator nodes
//!
//! Drivers sit on `embedded-hal` 1.0 traits so the same code drives RP2040
//! peripherals on target and plain fakes on the host:
//!
//! - Relays with configurable polarity (humidifiers, buzzer)
//! - PWM motors with percent speed (fans, turbine, pump)
//! - PWM LED bars for the flow visualizers
//! - Actuator banks implementing the core [`Actuators`] trait
//!
//! Hardware write errors never propagate. They are counted per driver and
//! the last requested state is kept.
//!
//! [`Actuators`]: pltn_core::traits::Actuators

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bank;
pub mod led;
pub mod motor;
pub mod relay;

pub use bank::PlantActuators;
pub use led::LedBar;
pub use motor::PwmMotor;
pub use relay::{Polarity, Relay};

#[cfg(test)]
pub(crate) mod fakes {
    //! Recording pins for host tests

    use core::convert::Infallible;
    use embedded_hal::{digital, pwm};

    /// Output pin remembering its level and write count
    #[derive(Debug, Default)]
    pub struct FakePin {
        pub high: bool,
        pub writes: usize,
    }

    impl digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl digital::OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[derive(Debug)]
    pub struct Fault;

    impl digital::Error for Fault {
        fn kind(&self) -> digital::ErrorKind {
            digital::ErrorKind::Other
        }
    }

    impl pwm::Error for Fault {
        fn kind(&self) -> pwm::ErrorKind {
            pwm::ErrorKind::Other
        }
    }

    /// Pin whose every write fails
    #[derive(Debug, Default)]
    pub struct BrokenPin;

    impl digital::ErrorType for BrokenPin {
        type Error = Fault;
    }

    impl digital::OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Fault> {
            Err(Fault)
        }

        fn set_high(&mut self) -> Result<(), Fault> {
            Err(Fault)
        }
    }

    /// PWM channel with a 0..=1000 duty range
    #[derive(Debug, Default)]
    pub struct FakePwm {
        pub duty: u16,
        pub broken: bool,
    }

    impl pwm::ErrorType for FakePwm {
        type Error = Fault;
    }

    impl pwm::SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Fault> {
            if self.broken {
                return Err(Fault);
            }
            self.duty = duty;
            Ok(())
        }
    }
}
