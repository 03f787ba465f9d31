//! LPC40xx-specific HAL for Twiline
//!
//! This crate drives the three I2C controllers of the LPC40xx family as
//! interrupt-driven bus masters:
//!
//! - [`registers`] - register block access, memory-mapped or simulated
//! - [`bus`] - per-controller state shared with the interrupt handler, and
//!   the static [`BUSES`] registry
//! - [`controller`] - the blocking [`I2c`] master
//! - [`interrupts`] - NVIC registration and dispatch
//!
//! # Usage
//!
//! ```ignore
//! use twiline_hal::I2cBus;
//! use twiline_hal_lpc40xx::{bus, interrupts::Nvic, BusId, I2c, SystemClock};
//!
//! let mut i2c = I2c::new(bus(BusId::I2c2), SystemClock, I2cConfig::default());
//! i2c.initialize(&board.pins, &board.syscon, &Nvic)?;
//!
//! let mut id = [0u8; 2];
//! i2c.write_read(0x48, &[0x07], &mut id)?;
//! ```
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support and driver logging

#![no_std]

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod clock;
pub mod controller;
pub mod error;
pub mod interrupts;
pub mod registers;

#[cfg(test)]
mod sim;

pub use bus::{bus, Bus, BusId, Descriptor, TraceEntry, BUSES};
pub use clock::SystemClock;
pub use controller::I2c;
pub use error::Error;
pub use registers::{Mmio, Registers};

// Re-export shared types from twiline-hal
pub use twiline_hal::I2cConfig;
