//! Deadline waits
//!
//! The blocking side of a transaction parks here until the interrupt
//! handler reports completion or the caller's timeout runs out.

use embassy_time::Duration;

use crate::traits::Clock;

/// The deadline passed before the condition became true
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimedOut;

/// Spin until `done` returns true or `timeout` has elapsed on `clock`
///
/// `done` is checked before the clock on every pass, so a condition that
/// is already true never times out, even with a zero timeout. A timeout
/// too large to represent waits forever.
pub fn wait_until<C, F>(clock: &C, timeout: Duration, mut done: F) -> Result<(), TimedOut>
where
    C: Clock + ?Sized,
    F: FnMut() -> bool,
{
    let deadline = clock.now().checked_add(timeout);

    loop {
        if done() {
            return Ok(());
        }
        if let Some(deadline) = deadline {
            if clock.now() >= deadline {
                return Err(TimedOut);
            }
        }
        core::hint::spin_loop();
    }
}
