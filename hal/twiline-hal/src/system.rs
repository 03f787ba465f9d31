//! System controller abstractions
//!
//! Peripheral power gating and clock frequency queries.

/// Peripheral identifier
///
/// On LPC40xx parts this is the bit index of the peripheral in the `PCONP`
/// power control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralId(pub u8);

/// Peripheral power and clock control
pub trait SystemController {
    /// Error type for power control
    type Error;

    /// Power up a peripheral
    ///
    /// Returns the frequency of the clock feeding the peripheral in Hz.
    /// Powering up an already powered peripheral is not an error.
    fn power_up(&self, peripheral: PeripheralId) -> Result<u32, Self::Error>;

    /// Check if a peripheral is powered
    fn is_powered(&self, peripheral: PeripheralId) -> bool;
}

impl<T: SystemController + ?Sized> SystemController for &T {
    type Error = T::Error;

    fn power_up(&self, peripheral: PeripheralId) -> Result<u32, Self::Error> {
        (**self).power_up(peripheral)
    }

    fn is_powered(&self, peripheral: PeripheralId) -> bool {
        (**self).is_powered(peripheral)
    }
}
