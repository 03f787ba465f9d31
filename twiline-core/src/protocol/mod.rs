//! Master-mode protocol state machine
//!
//! The controller reports where on the bus it is through an 8-bit status
//! code. Every interrupt, the handler feeds that code and the current
//! transaction into [`service`], which decides which control bits to set and
//! clear and whether a byte goes into the data register.
//!
//! The state machine is explicit, finite and deterministic: the response is
//! a function of the status code, the received byte and the record alone.

pub mod control;
pub mod machine;
pub mod state;

pub use control::Control;
pub use machine::{service, Response};
pub use state::{MasterState, UnknownState};
