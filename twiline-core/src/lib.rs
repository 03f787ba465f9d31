//! Board-agnostic core logic for the Twiline I2C master driver
//!
//! This crate contains everything about an I2C master transfer that does
//! not depend on a particular register block:
//!
//! - The transaction record shared between a blocking caller and the
//!   interrupt handler
//! - The master-mode protocol state machine (status code in, control bits
//!   out)
//! - Clock divider math for the SCL duty cycle
//! - The deadline wait used by blocking callers
//! - The [`traits::Clock`] abstraction those waits run against

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod protocol;
pub mod timing;
pub mod traits;
pub mod transaction;
pub mod wait;

pub use protocol::{service, Control, MasterState, Response};
pub use transaction::{Address, Operation, Status, Transaction, TransactionInfo};
