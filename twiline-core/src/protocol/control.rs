//! Control register bits
//!
//! Bit positions are fixed by the controller silicon. The control register
//! is never written directly: bits are set through a write-one-to-set
//! register and cleared through a write-one-to-clear register.

use core::ops::{BitOr, BitOrAssign};

/// Set of control register bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control(u32);

impl Control {
    /// No bits
    pub const NONE: Self = Self(0);
    /// AA: acknowledge the next received byte
    pub const ASSERT_ACK: Self = Self(1 << 2);
    /// SI: interrupt pending; clearing it lets the controller continue
    pub const INTERRUPT: Self = Self(1 << 3);
    /// STO: transmit a STOP condition
    pub const STOP: Self = Self(1 << 4);
    /// STA: transmit a (repeated) START condition
    pub const START: Self = Self(1 << 5);
    /// I2EN: interface enable
    pub const ENABLE: Self = Self(1 << 6);

    const ALL: u32 = 0b0111_1100;

    /// Raw register value
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from a raw register value, dropping reserved bits
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    /// Check if every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if no bit is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Bits set in either
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bits of `self` not set in `other`
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for Control {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Control {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_positions() {
        assert_eq!(Control::ASSERT_ACK.bits(), 0x04);
        assert_eq!(Control::INTERRUPT.bits(), 0x08);
        assert_eq!(Control::STOP.bits(), 0x10);
        assert_eq!(Control::START.bits(), 0x20);
        assert_eq!(Control::ENABLE.bits(), 0x40);
    }

    #[test]
    fn test_set_operations() {
        let bits = Control::START | Control::STOP;
        assert!(bits.contains(Control::START));
        assert!(!bits.contains(Control::ASSERT_ACK));
        assert_eq!(bits.difference(Control::START), Control::STOP);
        assert!(Control::NONE.is_empty());
        assert_eq!(Control::from_bits_truncate(0xFFFF_FFFF).bits(), 0x7C);
    }
}
