//! Transaction record
//!
//! One in-flight bus operation: who we are talking to, what we send, where
//! received bytes go, and how far along we are. The record borrows the
//! caller's buffers for the duration of the blocking call; the interrupt
//! handler advances it one status code at a time through
//! [`crate::protocol::service`].

use embassy_time::Duration;

/// Timeout used when the caller does not pick one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

/// Transfer direction, encoded as the R/W bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Master transmits
    Write = 0,
    /// Master receives
    Read = 1,
}

/// Target device address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// 7-bit address (upper bit of the `u8` is ignored)
    SevenBit(u8),
    /// 10-bit address (upper six bits of the `u16` are ignored)
    TenBit(u16),
}

impl Address {
    /// First byte on the wire after a (repeated) start
    ///
    /// For 7-bit addresses this is the full address plus R/W bit. For
    /// 10-bit addresses it is the `11110xx` header carrying the two most
    /// significant address bits.
    pub const fn header(self, operation: Operation) -> u8 {
        match self {
            Address::SevenBit(address) => ((address & 0x7F) << 1) | operation as u8,
            Address::TenBit(address) => {
                0xF0 | (((address >> 7) & 0x06) as u8) | operation as u8
            }
        }
    }

    /// Low eight bits of a 10-bit address, sent as the second address byte
    pub const fn low_byte(self) -> Option<u8> {
        match self {
            Address::SevenBit(_) => None,
            Address::TenBit(address) => Some(address as u8),
        }
    }

    /// Check if this is a 10-bit address
    pub const fn is_ten_bit(self) -> bool {
        matches!(self, Address::TenBit(_))
    }
}

impl From<u8> for Address {
    fn from(address: u8) -> Self {
        Address::SevenBit(address)
    }
}

/// Outcome of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Every byte was transferred
    Success,
    /// The controller reported an illegal START/STOP on the bus
    BusError,
    /// No device acknowledged the address
    DeviceNotFound,
    /// The caller's deadline passed before the transfer finished
    TimedOut,
    /// Still running
    InProgress,
    /// The controller reported a status code the driver has no branch for.
    /// Driver and hardware disagree about where the transfer is.
    InternalFatal {
        /// Raw status register value
        state: u8,
    },
}

impl Status {
    /// Check if this is a final outcome
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

/// Progress through the address bytes of a 10-bit transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddressPhase {
    /// Header not yet acknowledged
    Header,
    /// Low address byte sent, waiting for its acknowledge
    LowByte,
    /// Address fully acknowledged
    Complete,
}

/// The shared, mutable description of one bus operation
#[derive(Debug)]
pub struct Transaction<'a> {
    address: Address,
    /// Current phase; switches to `Read` at the repeated start
    pub(crate) operation: Operation,
    data_out: &'a [u8],
    pub(crate) data_in: &'a mut [u8],
    /// Cursor into whichever buffer is active
    pub(crate) position: usize,
    repeated: bool,
    pub(crate) busy: bool,
    pub(crate) status: Status,
    timeout: Duration,
    /// Direction requested by the caller, restored on arbitration retry
    initial: Operation,
    pub(crate) phase: AddressPhase,
}

impl<'a> Transaction<'a> {
    fn new(
        address: Address,
        operation: Operation,
        data_out: &'a [u8],
        data_in: &'a mut [u8],
        repeated: bool,
    ) -> Self {
        Self {
            address,
            operation,
            data_out,
            data_in,
            position: 0,
            repeated,
            busy: false,
            status: Status::InProgress,
            timeout: DEFAULT_TIMEOUT,
            initial: operation,
            phase: AddressPhase::Header,
        }
    }

    /// Write `data` to the device
    ///
    /// An empty `data` only sends the address, which is how a device is
    /// probed.
    pub fn write(address: impl Into<Address>, data: &'a [u8]) -> Self {
        Self::new(address.into(), Operation::Write, data, &mut [], false)
    }

    /// Read `buf.len()` bytes from the device
    ///
    /// A 10-bit read has to send both address bytes in write direction
    /// first, so it starts as an empty write chained to the read with a
    /// repeated start.
    pub fn read(address: impl Into<Address>, buf: &'a mut [u8]) -> Self {
        let address = address.into();
        if address.is_ten_bit() {
            Self::new(address, Operation::Write, &[], buf, true)
        } else {
            Self::new(address, Operation::Read, &[], buf, false)
        }
    }

    /// Write `data`, then read into `buf` after a repeated start
    ///
    /// With an empty `data` this is a plain read, with an empty `buf` a
    /// plain write.
    pub fn write_read(address: impl Into<Address>, data: &'a [u8], buf: &'a mut [u8]) -> Self {
        if data.is_empty() {
            Self::read(address, buf)
        } else if buf.is_empty() {
            Self::write(address, data)
        } else {
            Self::new(address.into(), Operation::Write, data, buf, true)
        }
    }

    /// Address-only transfer used to check whether a device is present
    pub fn probe(address: impl Into<Address>) -> Self {
        Self::write(address, &[])
    }

    /// Set the deadline for the whole transaction
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reset progress and mark the record busy
    ///
    /// Called when the record is handed to the controller, just before the
    /// START condition is requested.
    pub fn begin(&mut self) {
        self.operation = self.initial;
        self.position = 0;
        self.phase = AddressPhase::Header;
        self.busy = true;
        self.status = Status::InProgress;
    }

    /// Give up on the transaction after its deadline passed
    pub fn time_out(&mut self) {
        self.busy = false;
        self.status = Status::TimedOut;
    }

    /// Target address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current transfer phase
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Number of bytes to write
    pub fn out_length(&self) -> usize {
        self.data_out.len()
    }

    /// Number of bytes to read
    pub fn in_length(&self) -> usize {
        self.data_in.len()
    }

    /// Cursor into the active buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if the write phase chains into a read
    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    /// Check if the transfer is still running
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Current outcome
    pub fn status(&self) -> Status {
        self.status
    }

    /// Deadline for the whole transaction
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check if both a write and a read phase were requested
    pub fn is_multi_phase(&self) -> bool {
        self.out_length() != 0 && self.in_length() != 0
    }

    /// Copy of everything but the buffers
    pub fn info(&self) -> TransactionInfo {
        TransactionInfo {
            address: self.address,
            operation: self.operation,
            out_length: self.out_length(),
            in_length: self.in_length(),
            position: self.position,
            status: self.status,
        }
    }

    /// Address byte for the current phase
    pub(crate) fn address_byte(&self) -> u8 {
        self.address.header(self.operation)
    }

    /// Second address byte of a 10-bit transfer, once
    pub(crate) fn take_address_low_byte(&mut self) -> Option<u8> {
        if self.phase != AddressPhase::Header {
            return None;
        }
        let low = self.address.low_byte();
        self.phase = match low {
            Some(_) => AddressPhase::LowByte,
            None => AddressPhase::Complete,
        };
        low
    }

    /// Next byte of the write payload, advancing the cursor
    pub(crate) fn next_out(&mut self) -> Option<u8> {
        let byte = self.data_out.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }

    /// Store a received byte at the cursor, advancing it
    ///
    /// Returns false once the buffer is full.
    pub(crate) fn store_in(&mut self, byte: u8) -> bool {
        match self.data_in.get_mut(self.position) {
            Some(slot) => {
                *slot = byte;
                self.position += 1;
                true
            }
            None => false,
        }
    }

    /// Start over after losing arbitration
    pub(crate) fn rewind(&mut self) {
        self.operation = self.initial;
        self.position = 0;
        self.phase = AddressPhase::Header;
    }

    /// Reach a terminal outcome
    pub(crate) fn finish(&mut self, status: Status) {
        self.busy = false;
        self.status = status;
    }
}

/// Snapshot of a transaction without its buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransactionInfo {
    /// Target address
    pub address: Address,
    /// Phase the transaction ended in
    pub operation: Operation,
    /// Requested write length
    pub out_length: usize,
    /// Requested read length
    pub in_length: usize,
    /// Final cursor position
    pub position: usize,
    /// Outcome
    pub status: Status,
}
