//! PWM slice setup
//!
//! Every slice runs both channels with the same top value, so a duty of
//! `PWM_TOP` is fully on. At the default divider the period is 8 us, well
//! above anything the fans or LEDs can show.

use embassy_rp::pwm::Config;

/// Counter wrap value shared by every slice
pub const PWM_TOP: u16 = 1000;

/// Slice configuration with both outputs at 0% duty
pub fn output_config() -> Config {
    let mut config = Config::default();
    config.top = PWM_TOP;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}
