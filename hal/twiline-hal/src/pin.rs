//! Pin configuration abstractions
//!
//! The I2C driver never owns its pins. It names them by port and pin number
//! and asks the board's pin controller to put them into the right mode.

/// A pin identified by port and pin number (e.g. `P1.30` is `PinId::new(1, 30)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    /// GPIO port
    pub port: u8,
    /// Pin within the port
    pub pin: u8,
}

impl PinId {
    /// Create a pin identifier
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }
}

/// Internal pull resistor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resistor {
    /// No internal resistor; the bus relies on external pull-ups
    None,
    /// Pull down to ground
    PullDown,
    /// Pull up to supply
    PullUp,
    /// Keep the last driven level
    Repeater,
}

/// Pin multiplexing and electrical configuration
///
/// Implemented by board support code. Every call may fail, e.g. when a pin
/// does not exist on the package or is locked by another owner.
pub trait PinControl {
    /// Error type for pin configuration
    type Error;

    /// Route a peripheral function to the pin
    ///
    /// `function` is the raw function selector from the chip's I/O
    /// configuration table.
    fn set_function(&self, pin: PinId, function: u8) -> Result<(), Self::Error>;

    /// Enable or disable open-drain output
    fn set_open_drain(&self, pin: PinId, open_drain: bool) -> Result<(), Self::Error>;

    /// Select the internal pull resistor
    fn set_pull(&self, pin: PinId, resistor: Resistor) -> Result<(), Self::Error>;
}

impl<T: PinControl + ?Sized> PinControl for &T {
    type Error = T::Error;

    fn set_function(&self, pin: PinId, function: u8) -> Result<(), Self::Error> {
        (**self).set_function(pin, function)
    }

    fn set_open_drain(&self, pin: PinId, open_drain: bool) -> Result<(), Self::Error> {
        (**self).set_open_drain(pin, open_drain)
    }

    fn set_pull(&self, pin: PinId, resistor: Resistor) -> Result<(), Self::Error> {
        (**self).set_pull(pin, resistor)
    }
}
