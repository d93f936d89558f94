//! Core clock backed by the embassy time driver

use pltn_core::traits::Clock;
use pltn_core::Instant;

/// Milliseconds since boot from `embassy_time`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::from_millis(embassy_time::Instant::now().as_millis())
    }
}
