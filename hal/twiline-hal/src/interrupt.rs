//! Interrupt abstractions
//!
//! Drivers hand the interrupt controller a `'static` handler object that
//! already knows which peripheral instance it services, so one handler type
//! can serve any number of identical peripherals.

/// Interrupt service routine bound to one peripheral instance
///
/// `on_interrupt` runs in interrupt context. It must not block and it runs
/// to completion before the next interrupt on the same line is serviced.
pub trait InterruptHandler: Sync {
    /// Service one pending interrupt
    fn on_interrupt(&self);
}

/// Interrupt registration
pub trait InterruptController {
    /// Error type for registration
    type Error;

    /// Install `handler` for interrupt line `irq` and enable the line
    ///
    /// Registering the same handler twice for the same line is allowed
    /// and leaves the controller in the same state as registering once.
    fn register(
        &self,
        irq: u16,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Self::Error>;
}

impl<T: InterruptController + ?Sized> InterruptController for &T {
    type Error = T::Error;

    fn register(
        &self,
        irq: u16,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Self::Error> {
        (**self).register(irq, handler)
    }
}
