//! I2C register block access
//!
//! The driver only touches six registers. They sit behind the [`Registers`]
//! trait so the interrupt handler and the blocking facade can be exercised
//! against a simulated controller on the host.

use core::ptr;

use twiline_core::timing::ClockDividers;
use twiline_core::Control;

/// Control set register (write 1 to set)
pub const CONSET: usize = 0x00;
/// Status register
pub const STAT: usize = 0x04;
/// Data register
pub const DAT: usize = 0x08;
/// SCL high duty cycle
pub const SCLH: usize = 0x10;
/// SCL low duty cycle
pub const SCLL: usize = 0x14;
/// Control clear register (write 1 to clear)
pub const CONCLR: usize = 0x18;

/// I2C0 register block
pub const I2C0_BASE: usize = 0x4001_C000;
/// I2C1 register block
pub const I2C1_BASE: usize = 0x4005_C000;
/// I2C2 register block
pub const I2C2_BASE: usize = 0x400A_0000;

/// One I2C controller's registers
///
/// Writes through `set_control` and `clear_control` only affect the bits
/// passed; the others keep their value.
pub trait Registers {
    /// Current status code
    fn status(&self) -> u8;

    /// Last byte shifted in
    fn data(&self) -> u8;

    /// Load the next byte to shift out
    fn write_data(&self, byte: u8);

    /// Current control bits
    fn control(&self) -> Control;

    /// Set control bits
    fn set_control(&self, bits: Control);

    /// Clear control bits
    fn clear_control(&self, bits: Control);

    /// Program the SCL high/low counts
    fn set_duty_cycle(&self, dividers: ClockDividers);

    /// Read back the SCL high/low counts
    fn duty_cycle(&self) -> ClockDividers;
}

/// Memory-mapped register block
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Wrap the register block at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the address of an LPC40xx I2C register block, and
    /// nothing else may write that block while this value is in use.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block
    pub fn base(&self) -> usize {
        self.base
    }

    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` requires `base` to be a valid register block, and all
        // offsets used are inside it.
        unsafe { ptr::read_volatile((self.base + offset) as *const u32) }
    }

    fn write(&self, offset: usize, value: u32) {
        // SAFETY: as in `read`
        unsafe { ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

impl Registers for Mmio {
    fn status(&self) -> u8 {
        (self.read(STAT) & 0xF8) as u8
    }

    fn data(&self) -> u8 {
        self.read(DAT) as u8
    }

    fn write_data(&self, byte: u8) {
        self.write(DAT, byte as u32);
    }

    fn control(&self) -> Control {
        Control::from_bits_truncate(self.read(CONSET))
    }

    fn set_control(&self, bits: Control) {
        self.write(CONSET, bits.bits());
    }

    fn clear_control(&self, bits: Control) {
        self.write(CONCLR, bits.bits());
    }

    fn set_duty_cycle(&self, dividers: ClockDividers) {
        self.write(SCLH, dividers.high);
        self.write(SCLL, dividers.low);
    }

    fn duty_cycle(&self) -> ClockDividers {
        ClockDividers {
            high: self.read(SCLH) & 0xFFFF,
            low: self.read(SCLL) & 0xFFFF,
        }
    }
}
