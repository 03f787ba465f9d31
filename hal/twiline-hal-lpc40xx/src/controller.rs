//! Blocking I2C master
//!
//! [`I2c`] is what application code holds. It brings a controller up, and
//! runs one transaction at a time by attaching it to the controller's
//! [`Bus`], issuing START and waiting for the interrupt handler to finish
//! it or for the timeout to run out.
//!
//! # Timeouts
//!
//! A transaction that has not finished by its deadline is abandoned: STOP
//! is requested with the acknowledge bit cleared, so a read in progress is
//! ended with a NACK, and the transaction reports [`Error::TimedOut`]. START
//! is withdrawn on every exit so a half-issued START cannot fire later.

use embassy_time::Duration;
use heapless::Vec;
use twiline_core::timing::ClockDividers;
use twiline_core::traits::Clock;
use twiline_core::transaction::DEFAULT_TIMEOUT;
use twiline_core::wait::wait_until;
use twiline_core::{Address, Control, Transaction, TransactionInfo};
use twiline_hal::{
    I2cBus, I2cConfig, InterruptController, PinControl, Resistor, SystemController,
};

use crate::bus::Bus;
use crate::error::Error;
use crate::registers::Registers;

/// Lowest non-reserved 7-bit address
pub const SCAN_FIRST: u8 = 0x08;
/// Highest non-reserved 7-bit address
pub const SCAN_LAST: u8 = 0x77;

/// Addresses found by [`I2c::scan`]
pub type ScanResult = Vec<u8, { (SCAN_LAST - SCAN_FIRST + 1) as usize }>;

/// Blocking master on one controller
///
/// Only one `I2c` may drive a given [`Bus`] at a time. Transactions from
/// two handles on the same controller are not serialized.
pub struct I2c<R: 'static, C> {
    bus: &'static Bus<R>,
    clock: C,
    config: I2cConfig,
    timeout: Duration,
    last: Option<TransactionInfo>,
}

impl<R, C> I2c<R, C>
where
    R: Registers + Sync + 'static,
    C: Clock,
{
    /// Create a master on `bus`
    ///
    /// Nothing is touched until [`initialize`](Self::initialize).
    pub fn new(bus: &'static Bus<R>, clock: C, config: I2cConfig) -> Self {
        Self {
            bus,
            clock,
            config,
            timeout: DEFAULT_TIMEOUT,
            last: None,
        }
    }

    /// Timeout applied by the [`I2cBus`] and `embedded-hal` methods
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Configuration in use
    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    /// The controller state this master drives
    pub fn bus(&self) -> &'static Bus<R> {
        self.bus
    }

    /// Bring the controller up
    ///
    /// Routes the pins, powers the peripheral, programs the SCL duty cycle
    /// for the configured frequency, enables the controller and installs
    /// the interrupt handler. Calling it again reapplies the same settings.
    pub fn initialize<P, S, N>(
        &mut self,
        pins: &P,
        system: &S,
        interrupts: &N,
    ) -> Result<(), Error>
    where
        P: PinControl,
        S: SystemController,
        N: InterruptController,
    {
        let descriptor = *self.bus.descriptor();
        let registers = self.bus.registers();

        for pin in [descriptor.sda, descriptor.scl] {
            pins.set_function(pin, descriptor.pin_function).map_err(|_| Error::PinConfig)?;
            pins.set_open_drain(pin, true).map_err(|_| Error::PinConfig)?;
            pins.set_pull(pin, Resistor::None).map_err(|_| Error::PinConfig)?;
        }

        let peripheral_hz = system
            .power_up(descriptor.peripheral)
            .map_err(|_| Error::Power)?;

        let dividers = ClockDividers::compute(peripheral_hz, self.config.frequency)
            .ok_or(Error::InvalidFrequency)?;

        registers.set_duty_cycle(dividers);
        registers.clear_control(
            Control::ASSERT_ACK | Control::INTERRUPT | Control::STOP | Control::START,
        );
        registers.set_control(Control::ENABLE);

        interrupts
            .register(descriptor.irq, self.bus)
            .map_err(|_| Error::InterruptRegistration)?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "I2C on IRQ {} at {} Hz (high {}, low {})",
            descriptor.irq,
            dividers.frequency(peripheral_hz),
            dividers.high,
            dividers.low
        );

        Ok(())
    }

    /// Whether the controller is enabled
    pub fn is_initialized(&self) -> bool {
        self.bus.registers().control().contains(Control::ENABLE)
    }

    /// Run `txn` to completion
    ///
    /// Blocks until the interrupt handler finishes the transaction or its
    /// timeout elapses. Read data lands in the transaction's buffer.
    pub fn submit(&mut self, txn: Transaction<'_>) -> Result<(), Error> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let timeout = txn.timeout();
        #[cfg(feature = "defmt")]
        let address = txn.address();
        let registers = self.bus.registers();
        let clock = &self.clock;

        let (info, ()) = self.bus.execute(txn, |bus| {
            registers.set_control(Control::START);

            if wait_until(clock, timeout, || !bus.is_busy()).is_err() {
                registers.set_control(Control::STOP);
                registers.clear_control(Control::ASSERT_ACK);

                if bus.time_out() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "I2C write-read to {} timed out; the read was cut short",
                        address
                    );
                }
            }

            registers.clear_control(Control::START);
        });

        self.last = Some(info);
        Error::check(info.status)
    }

    /// Outcome of the most recent transaction
    pub fn last_transaction(&self) -> Option<TransactionInfo> {
        self.last
    }

    /// Write to a 10-bit address
    pub fn write_ten_bit(&mut self, address: u16, data: &[u8]) -> Result<(), Error> {
        let txn = Transaction::write(Address::TenBit(address), data).with_timeout(self.timeout);
        self.submit(txn)
    }

    /// Read from a 10-bit address
    pub fn read_ten_bit(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Error> {
        let txn = Transaction::read(Address::TenBit(address), buf).with_timeout(self.timeout);
        self.submit(txn)
    }

    /// Probe every non-reserved 7-bit address
    pub fn scan(&mut self) -> ScanResult {
        let mut found = ScanResult::new();
        for address in SCAN_FIRST..=SCAN_LAST {
            if self.probe(address) {
                // Capacity covers the whole range
                let _ = found.push(address);
            }
        }
        found
    }
}

impl<R, C> I2cBus for I2c<R, C>
where
    R: Registers + Sync + 'static,
    C: Clock,
{
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        let txn = Transaction::write(address, data).with_timeout(self.timeout);
        self.submit(txn)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        let txn = Transaction::read(address, buf).with_timeout(self.timeout);
        self.submit(txn)
    }

    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<(), Self::Error> {
        let txn = Transaction::write_read(address, data, buf).with_timeout(self.timeout);
        self.submit(txn)
    }
}

impl<R: 'static, C> embedded_hal::i2c::ErrorType for I2c<R, C> {
    type Error = Error;
}

/// Blocking `embedded-hal` master
///
/// A transaction carries one outgoing and one incoming buffer, so only the
/// shapes that fit are accepted: nothing, one write, one read, or a write
/// followed by a read. Anything else, including two adjacent writes that
/// would need to go out as one contiguous payload, returns
/// [`Error::UnsupportedOperation`] without touching the bus.
impl<R, C> embedded_hal::i2c::I2c for I2c<R, C>
where
    R: Registers + Sync + 'static,
    C: Clock,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [embedded_hal::i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        use embedded_hal::i2c::Operation as Op;

        match operations {
            [] => Ok(()),
            [Op::Write(data)] => I2cBus::write(self, address, data),
            [Op::Read(buf)] => I2cBus::read(self, address, buf),
            [Op::Write(data), Op::Read(buf)] => I2cBus::write_read(self, address, data, buf),
            _ => Err(Error::UnsupportedOperation),
        }
    }
}
