//! Twiline Hardware Abstraction Layer
//!
//! This crate defines the traits a chip-specific I2C driver consumes from
//! the rest of the system (pin muxing, power gating, interrupt dispatch) and
//! the trait it offers back to application code. Nothing in here touches
//! hardware directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / device drivers           │
//! └─────────────────────────────────────────┘
//!                     │  I2cBus
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  twiline-hal-lpc40xx (controller)       │──► twiline-core (protocol)
//! └─────────────────────────────────────────┘
//!                     │  PinControl, SystemController,
//!                     │  InterruptController
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Board support (pins, clocks, NVIC)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pin::PinControl`] - Pin function and electrical configuration
//! - [`system::SystemController`] - Peripheral power and clock queries
//! - [`interrupt::InterruptController`], [`interrupt::InterruptHandler`] -
//!   Interrupt registration and service routines
//! - [`i2c::I2cBus`] - I2C bus operations

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod interrupt;
pub mod pin;
pub mod system;

// Re-export key traits at crate root for convenience
pub use i2c::{I2cBus, I2cConfig};
pub use interrupt::{InterruptController, InterruptHandler};
pub use pin::{PinControl, PinId, Resistor};
pub use system::{PeripheralId, SystemController};
