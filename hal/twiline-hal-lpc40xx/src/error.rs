//! Driver errors

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use twiline_core::Status;

/// Error from the I2C driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Illegal START or STOP seen on the bus
    BusError,
    /// The address was not acknowledged
    DeviceNotFound,
    /// No completion within the transaction's timeout
    TimedOut,
    /// The controller reported a status code the driver has no handler for
    InternalFatal {
        /// Raw status code
        state: u8,
    },
    /// The controller has not been initialized
    NotInitialized,
    /// The pin controller rejected the SDA/SCL configuration
    PinConfig,
    /// The peripheral could not be powered
    Power,
    /// The interrupt handler could not be installed
    InterruptRegistration,
    /// The requested bus frequency cannot be timed from the peripheral clock
    InvalidFrequency,
    /// Operation sequence the controller cannot run as one transaction
    UnsupportedOperation,
}

impl Error {
    /// Map a finished transaction's status to a result
    pub fn check(status: Status) -> Result<(), Self> {
        match status {
            Status::Success => Ok(()),
            Status::BusError => Err(Self::BusError),
            Status::DeviceNotFound => Err(Self::DeviceNotFound),
            Status::TimedOut => Err(Self::TimedOut),
            Status::InternalFatal { state } => Err(Self::InternalFatal { state }),
            // Detached without an outcome
            Status::InProgress => Err(Self::TimedOut),
        }
    }

    /// Whether driver and hardware have lost sync
    ///
    /// Retrying after a fatal error is pointless until the controller is
    /// reset.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InternalFatal { .. })
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::BusError => ErrorKind::Bus,
            Self::DeviceNotFound => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            _ => ErrorKind::Other,
        }
    }
}
