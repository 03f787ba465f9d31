//! Master-mode status codes
//!
//! Values are fixed by the controller's status register and shared by most
//! parts that carry this style of I2C block.

/// Status codes the master-mode state machine handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MasterState {
    /// Illegal START or STOP seen on the bus
    BusError = 0x00,
    /// START transmitted
    StartCondition = 0x08,
    /// Repeated START transmitted
    RepeatedStart = 0x10,
    /// Address + W transmitted, ACK received
    AddressWriteAck = 0x18,
    /// Address + W transmitted, NACK received
    AddressWriteNack = 0x20,
    /// Data byte transmitted, ACK received
    DataSentAck = 0x28,
    /// Data byte transmitted, NACK received
    DataSentNack = 0x30,
    /// Arbitration lost during address or data
    ArbitrationLost = 0x38,
    /// Address + R transmitted, ACK received
    AddressReadAck = 0x40,
    /// Address + R transmitted, NACK received
    AddressReadNack = 0x48,
    /// Data byte received, ACK returned
    DataReceivedAck = 0x50,
    /// Data byte received, NACK returned
    DataReceivedNack = 0x58,
    /// Own slave address received with W
    OwnAddressReceived = 0xA0,
    /// No relevant state information; SI is not set
    Idle = 0xF8,
}

/// Status code with no branch in the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownState(pub u8);

impl TryFrom<u8> for MasterState {
    type Error = UnknownState;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        use MasterState::*;

        Ok(match code {
            0x00 => BusError,
            0x08 => StartCondition,
            0x10 => RepeatedStart,
            0x18 => AddressWriteAck,
            0x20 => AddressWriteNack,
            0x28 => DataSentAck,
            0x30 => DataSentNack,
            0x38 => ArbitrationLost,
            0x40 => AddressReadAck,
            0x48 => AddressReadNack,
            0x50 => DataReceivedAck,
            0x58 => DataReceivedNack,
            0xA0 => OwnAddressReceived,
            0xF8 => Idle,
            other => return Err(UnknownState(other)),
        })
    }
}

impl MasterState {
    /// Raw status register value
    pub fn code(self) -> u8 {
        self as u8
    }
}
