//! State machine definition
//!
//! Every control-bit edit the driver makes while a transaction is running is
//! a function of the status code and the transaction record.

use super::control::Control;
use super::state::{MasterState, UnknownState};
use crate::transaction::{AddressPhase, Operation, Status, Transaction};

/// What the interrupt handler must do to the hardware
///
/// The handler writes `transmit` to the data register, then `set` to the
/// set register, then `clear` plus [`Control::INTERRUPT`] to the clear
/// register. Clearing the interrupt flag last is what lets the controller
/// move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    /// Bits to set
    pub set: Control,
    /// Bits to clear, not including the interrupt flag
    pub clear: Control,
    /// Byte for the data register
    pub transmit: Option<u8>,
}

/// Advance `txn` by one status code
///
/// `received` is the value of the data register when the interrupt fired;
/// it is only used in the data-received states.
///
/// A read finishes at 0x58 (data received, NACK returned), never at 0x50.
/// When the byte stored at 0x50 leaves one slot in the buffer, ACK is
/// withheld so the next byte is the last one, but the transaction stays
/// busy until 0x58 stores that byte. The buffer is therefore complete by
/// the time [`Transaction::is_busy`] turns false.
///
/// A status code outside the master-mode table means driver and hardware
/// have lost sync. The transaction is finished with
/// [`Status::InternalFatal`] and START/STOP are withdrawn so the bus is not
/// driven any further from an unknown state.
pub fn service(txn: &mut Transaction<'_>, code: u8, received: u8) -> Response {
    use MasterState::*;

    let state = match MasterState::try_from(code) {
        Ok(state) => state,
        Err(UnknownState(state)) => {
            txn.finish(Status::InternalFatal { state });
            return Response {
                clear: Control::STOP | Control::START,
                ..Response::default()
            };
        }
    };

    let mut response = Response::default();

    match state {
        BusError => {
            txn.finish(Status::BusError);
            response.set = Control::ASSERT_ACK | Control::STOP;
        }
        StartCondition => {
            response.transmit = Some(txn.address_byte());
        }
        RepeatedStart => {
            txn.operation = Operation::Read;
            response.transmit = Some(txn.address_byte());
        }
        AddressWriteAck => {
            response.clear = Control::START;
            if let Some(low) = txn.take_address_low_byte() {
                response.transmit = Some(low);
            } else if txn.out_length() == 0 {
                txn.finish(Status::Success);
                response.set = Control::STOP;
            } else {
                response.transmit = txn.next_out();
            }
        }
        AddressWriteNack => {
            response.clear = Control::START;
            txn.finish(Status::DeviceNotFound);
            response.set = Control::STOP;
        }
        DataSentAck => {
            if txn.phase == AddressPhase::LowByte {
                txn.phase = AddressPhase::Complete;
            }
            if txn.position >= txn.out_length() {
                if txn.is_repeated() {
                    txn.operation = Operation::Read;
                    txn.position = 0;
                    response.set = Control::START;
                } else {
                    txn.finish(Status::Success);
                    response.set = Control::STOP;
                }
            } else {
                response.transmit = txn.next_out();
            }
        }
        DataSentNack => {
            // A NACK on the low byte of a 10-bit address is an absent device
            let status = if txn.phase == AddressPhase::LowByte {
                Status::DeviceNotFound
            } else {
                Status::Success
            };
            txn.finish(status);
            response.set = Control::STOP;
        }
        ArbitrationLost => {
            txn.rewind();
            response.set = Control::START;
        }
        AddressReadAck => {
            response.clear = Control::START;
            match txn.in_length() {
                0 => {
                    txn.finish(Status::Success);
                    response.set = Control::STOP;
                }
                // NACK the only byte
                1 => response.clear |= Control::ASSERT_ACK,
                _ => response.set = Control::ASSERT_ACK,
            }
        }
        AddressReadNack => {
            response.clear = Control::START;
            txn.finish(Status::DeviceNotFound);
            response.set = Control::STOP;
        }
        DataReceivedAck => {
            let end = txn.in_length();
            if txn.position < end {
                txn.store_in(received);
            }
            // ACK for the next byte is decided while it is clocked in, so
            // withhold it one byte early. Completion is reported when the
            // NACKed final byte lands in DataReceivedNack.
            if txn.position + 1 >= end {
                response.clear = Control::ASSERT_ACK;
            } else {
                response.set = Control::ASSERT_ACK;
            }
        }
        DataReceivedNack => {
            if txn.in_length() != 0 {
                txn.store_in(received);
            }
            txn.finish(Status::Success);
            response.set = Control::STOP;
        }
        OwnAddressReceived | Idle => {}
    }

    response
}
