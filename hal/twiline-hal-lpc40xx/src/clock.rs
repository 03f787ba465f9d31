//! Time source for transaction deadlines

use embassy_time::Instant;
use twiline_core::traits::Clock;

/// The embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
