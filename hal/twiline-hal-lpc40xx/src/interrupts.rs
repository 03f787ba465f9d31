//! NVIC registration and dispatch
//!
//! Handlers are kept in a table indexed by interrupt number. The firmware's
//! vector table forwards each line to [`dispatch`]:
//!
//! ```ignore
//! #[interrupt]
//! fn I2C2() {
//!     twiline_hal_lpc40xx::interrupts::dispatch(12);
//! }
//! ```

use core::cell::Cell;

use cortex_m::interrupt::InterruptNumber;
use critical_section::Mutex;
use twiline_hal::{InterruptController, InterruptHandler};

/// Peripheral interrupt lines on LPC40xx parts
pub const IRQ_COUNT: usize = 41;

type HandlerCell = Mutex<Cell<Option<&'static dyn InterruptHandler>>>;

const EMPTY: HandlerCell = Mutex::new(Cell::new(None));

/// Interrupt number outside the handler table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqOutOfRange(pub u16);

/// Handlers by interrupt number
pub struct HandlerTable<const N: usize> {
    handlers: [HandlerCell; N],
}

impl<const N: usize> HandlerTable<N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            handlers: [EMPTY; N],
        }
    }

    /// Install `handler` for `irq`, replacing any previous one
    pub fn insert(
        &self,
        irq: u16,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), IrqOutOfRange> {
        let cell = self.handlers.get(irq as usize).ok_or(IrqOutOfRange(irq))?;
        critical_section::with(|cs| cell.borrow(cs).set(Some(handler)));
        Ok(())
    }

    /// Run the handler for `irq`
    ///
    /// Returns `false` if none is installed.
    pub fn dispatch(&self, irq: u16) -> bool {
        let handler = self
            .handlers
            .get(irq as usize)
            .and_then(|cell| critical_section::with(|cs| cell.borrow(cs).get()));

        match handler {
            Some(handler) => {
                handler.on_interrupt();
                true
            }
            None => false,
        }
    }
}

impl<const N: usize> Default for HandlerTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

static HANDLERS: HandlerTable<IRQ_COUNT> = HandlerTable::new();

/// Run the registered handler for `irq`
pub fn dispatch(irq: u16) {
    if !HANDLERS.dispatch(irq) {
        #[cfg(feature = "defmt")]
        defmt::warn!("Interrupt {} has no handler", irq);
    }
}

#[derive(Debug, Clone, Copy)]
struct Irq(u16);

// SAFETY: only built from numbers checked against `IRQ_COUNT`
unsafe impl InterruptNumber for Irq {
    fn number(self) -> u16 {
        self.0
    }
}

/// The Cortex-M NVIC backed by the global handler table
#[derive(Debug, Clone, Copy, Default)]
pub struct Nvic;

impl InterruptController for Nvic {
    type Error = IrqOutOfRange;

    fn register(
        &self,
        irq: u16,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Self::Error> {
        HANDLERS.insert(irq, handler)?;
        // SAFETY: the handler is installed before the line is unmasked, and
        // unmasking does not break any critical section of this driver.
        unsafe { cortex_m::peripheral::NVIC::unmask(Irq(irq)) };
        Ok(())
    }
}
