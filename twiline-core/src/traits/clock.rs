//! Monotonic time source

use embassy_time::Instant;

/// Monotonic clock used for transaction deadlines
///
/// Platforms with an embassy time driver can wrap [`Instant::now`]; tests
/// use a clock that advances when read.
pub trait Clock {
    /// Current time
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
