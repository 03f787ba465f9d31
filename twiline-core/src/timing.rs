//! SCL clock divider math
//!
//! The controller times the low and high halves of SCL in peripheral clock
//! cycles. A symmetric split at the target frequency is skewed 70/130 so the
//! low phase is shorter than the high phase, keeping the bus comfortably
//! inside the I2C timing limits at any target rate.

/// Low-phase share of a half period, in tenths
pub const DUTY_LOW_TENTHS: u64 = 7;

/// High-phase share of a half period, in tenths
pub const DUTY_HIGH_TENTHS: u64 = 13;

/// Largest value the 16-bit duty cycle registers hold
pub const MAX_DIVIDER: u32 = 0xFFFF;

/// SCL high/low counts for the duty cycle registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDividers {
    /// Peripheral clock cycles SCL stays high
    pub high: u32,
    /// Peripheral clock cycles SCL stays low
    pub low: u32,
}

impl ClockDividers {
    /// Compute dividers for a bus frequency
    ///
    /// `high = peripheral_hz / bus_hz / 2 * 1.3`, `low = ... * 0.7`, in
    /// integer arithmetic. Returns `None` if the bus frequency is zero or
    /// the result does not fit the registers.
    pub fn compute(peripheral_hz: u32, bus_hz: u32) -> Option<Self> {
        if bus_hz == 0 {
            return None;
        }

        let denominator = bus_hz as u64 * 2 * 10;
        let low = peripheral_hz as u64 * DUTY_LOW_TENTHS / denominator;
        let high = peripheral_hz as u64 * DUTY_HIGH_TENTHS / denominator;

        if low == 0 || high > MAX_DIVIDER as u64 {
            return None;
        }

        Some(Self {
            high: high as u32,
            low: low as u32,
        })
    }

    /// Resulting SCL frequency for a peripheral clock
    pub fn frequency(&self, peripheral_hz: u32) -> u32 {
        let period = self.high + self.low;
        if period == 0 {
            0
        } else {
            peripheral_hz / period
        }
    }
}
