//! Hardware abstraction traits
//!
//! These traits define the interface between the protocol logic and the
//! platform it runs on.

pub mod clock;

pub use clock::Clock;
