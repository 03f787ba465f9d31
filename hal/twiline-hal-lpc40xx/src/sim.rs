//! Simulated controller and board for host tests
//!
//! [`SimRegisters`] reacts to control writes the way the controller does:
//! clearing the interrupt flag moves the bus to its next status code based
//! on the control bits and the byte loaded. [`SimClock`] runs the interrupt
//! handler whenever an interrupt is pending, so the blocking facade can be
//! driven end to end on one thread.

use core::cell::Cell;
use std::boxed::Box;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::vec::Vec;

use embassy_time::Instant;
use twiline_core::timing::ClockDividers;
use twiline_core::traits::Clock;
use twiline_core::{Address, Control, Operation};
use twiline_hal::{
    InterruptController, InterruptHandler, PeripheralId, PinControl, PinId, Resistor,
    SystemController,
};

use crate::bus::{Bus, Descriptor};
use crate::registers::Registers;

/// One register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Data(u8),
    Set(Control),
    Clear(Control),
}

/// A device on the simulated bus
#[derive(Debug)]
pub struct Target {
    pub address: Address,
    /// Bytes the device acknowledged
    pub written: Vec<u8>,
    /// Bytes the device sends when read
    pub response: VecDeque<u8>,
    /// NACK every data byte after this many
    pub accept: Option<usize>,
    awaiting_low: bool,
}

impl Target {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            written: Vec::new(),
            response: VecDeque::new(),
            accept: None,
            awaiting_low: false,
        }
    }

    pub fn responding(mut self, bytes: &[u8]) -> Self {
        self.response.extend(bytes.iter().copied());
        self
    }

    fn matches_header(&mut self, byte: u8) -> bool {
        let read = byte & 1 == 1;
        match self.address {
            Address::SevenBit(address) => byte >> 1 == address,
            ten_bit => {
                let matched = byte & 0xFE == ten_bit.header(Operation::Write);
                if matched && !read {
                    self.awaiting_low = true;
                }
                matched
            }
        }
    }

    fn accept_byte(&mut self, byte: u8) -> bool {
        if self.awaiting_low {
            self.awaiting_low = false;
            return self.address.low_byte() == Some(byte);
        }
        if self.accept.is_some_and(|limit| self.written.len() >= limit) {
            return false;
        }
        self.written.push(byte);
        true
    }
}

/// Simulated controller state
#[derive(Debug)]
pub struct Sim {
    pub control: Control,
    pub status: u8,
    pub data: u8,
    pub pending: bool,
    pub log: Vec<Access>,
    pub target: Option<Target>,
    /// Arbitration losses still to inject on address bytes
    pub lose_arbitration: u32,
    /// START never produces an interrupt
    pub hang: bool,
    /// The first data byte produces a bus error
    pub bus_error: bool,
    duty: ClockDividers,
    loaded: Option<u8>,
}

impl Sim {
    pub fn new(target: Option<Target>) -> Self {
        Self {
            control: Control::NONE,
            status: 0xF8,
            data: 0,
            pending: false,
            log: Vec::new(),
            target,
            lose_arbitration: 0,
            hang: false,
            bus_error: false,
            duty: ClockDividers { high: 0, low: 0 },
            loaded: None,
        }
    }

    /// Force an interrupt with `status`
    pub fn raise(&mut self, status: u8) {
        self.status = status;
        self.pending = true;
    }

    /// Bytes loaded into the data register, in order
    pub fn transmitted(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|access| match access {
                Access::Data(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }

    /// How many writes set all of `bits`
    pub fn sets(&self, bits: Control) -> usize {
        self.log
            .iter()
            .filter(|access| matches!(access, Access::Set(set) if set.contains(bits)))
            .count()
    }

    /// How many writes cleared all of `bits`
    pub fn clears(&self, bits: Control) -> usize {
        self.log
            .iter()
            .filter(|access| matches!(access, Access::Clear(clear) if clear.contains(bits)))
            .count()
    }

    fn start(&mut self) {
        if !self.hang {
            self.raise(0x08);
        }
    }

    fn advance(&mut self) {
        match (self.status, self.loaded.take()) {
            (0x08 | 0x10, Some(byte)) => self.address(byte),
            _ if self.control.contains(Control::STOP) => {
                self.control = self.control.difference(Control::STOP);
                self.status = 0xF8;
            }
            _ if self.control.contains(Control::START) => {
                let bus_free = matches!(self.status, 0x00 | 0x38 | 0xF8);
                self.raise(if bus_free { 0x08 } else { 0x10 });
            }
            (0x18 | 0x28, Some(byte)) => self.transmit(byte),
            (0x40 | 0x50, _) => self.receive(),
            _ => {}
        }
    }

    fn address(&mut self, byte: u8) {
        if self.lose_arbitration > 0 {
            self.lose_arbitration -= 1;
            self.raise(0x38);
            return;
        }
        let read = byte & 1 == 1;
        let ack = self
            .target
            .as_mut()
            .is_some_and(|target| target.matches_header(byte));
        self.raise(match (read, ack) {
            (false, true) => 0x18,
            (false, false) => 0x20,
            (true, true) => 0x40,
            (true, false) => 0x48,
        });
    }

    fn transmit(&mut self, byte: u8) {
        if self.bus_error {
            self.raise(0x00);
            return;
        }
        let ack = self
            .target
            .as_mut()
            .is_some_and(|target| target.accept_byte(byte));
        self.raise(if ack { 0x28 } else { 0x30 });
    }

    fn receive(&mut self) {
        self.data = self
            .target
            .as_mut()
            .and_then(|target| target.response.pop_front())
            .unwrap_or(0xFF);
        let ack = self.control.contains(Control::ASSERT_ACK);
        self.raise(if ack { 0x50 } else { 0x58 });
    }
}

/// Register block backed by a [`Sim`]
#[derive(Debug)]
pub struct SimRegisters {
    sim: Mutex<Sim>,
}

impl SimRegisters {
    pub fn new(sim: Sim) -> Self {
        Self {
            sim: Mutex::new(sim),
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut Sim) -> T) -> T {
        f(&mut self.sim.lock().unwrap())
    }

    pub fn is_pending(&self) -> bool {
        self.with(|sim| sim.pending)
    }
}

impl Registers for SimRegisters {
    fn status(&self) -> u8 {
        self.with(|sim| sim.status)
    }

    fn data(&self) -> u8 {
        self.with(|sim| sim.data)
    }

    fn write_data(&self, byte: u8) {
        self.with(|sim| {
            sim.log.push(Access::Data(byte));
            sim.loaded = Some(byte);
        });
    }

    fn control(&self) -> Control {
        self.with(|sim| sim.control)
    }

    fn set_control(&self, bits: Control) {
        self.with(|sim| {
            sim.log.push(Access::Set(bits));
            sim.control |= bits;
            let idle = sim.status == 0xF8 && !sim.pending;
            if bits.contains(Control::START) && idle && sim.control.contains(Control::ENABLE) {
                sim.start();
            }
        });
    }

    fn clear_control(&self, bits: Control) {
        self.with(|sim| {
            sim.log.push(Access::Clear(bits));
            sim.control = sim.control.difference(bits);
            if bits.contains(Control::INTERRUPT) && sim.pending {
                sim.pending = false;
                sim.advance();
            }
        });
    }

    fn set_duty_cycle(&self, dividers: ClockDividers) {
        self.with(|sim| sim.duty = dividers);
    }

    fn duty_cycle(&self) -> ClockDividers {
        self.with(|sim| sim.duty)
    }
}

/// Leak a bus on I2C2 wiring around `sim`
pub fn leak_bus(sim: Sim) -> &'static Bus<SimRegisters> {
    Box::leak(Box::new(Bus::new(SimRegisters::new(sim), Descriptor::I2C2)))
}

/// Clock that advances 100 us per read and services pending interrupts
pub struct SimClock {
    bus: &'static Bus<SimRegisters>,
    ticks: Cell<u64>,
}

impl SimClock {
    pub fn new(bus: &'static Bus<SimRegisters>) -> Self {
        Self {
            bus,
            ticks: Cell::new(0),
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        if self.bus.registers().is_pending() {
            self.bus.on_interrupt();
        }
        let ticks = self.ticks.get();
        self.ticks.set(ticks + 1);
        Instant::from_micros(ticks * 100)
    }
}

/// Pin configuration call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    Function(PinId, u8),
    OpenDrain(PinId, bool),
    Pull(PinId, Resistor),
}

#[derive(Debug, Default)]
pub struct MockPins {
    pub calls: Mutex<Vec<PinCall>>,
    pub fail: bool,
}

impl MockPins {
    fn record(&self, call: PinCall) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl PinControl for MockPins {
    type Error = ();

    fn set_function(&self, pin: PinId, function: u8) -> Result<(), ()> {
        self.record(PinCall::Function(pin, function))
    }

    fn set_open_drain(&self, pin: PinId, open_drain: bool) -> Result<(), ()> {
        self.record(PinCall::OpenDrain(pin, open_drain))
    }

    fn set_pull(&self, pin: PinId, resistor: Resistor) -> Result<(), ()> {
        self.record(PinCall::Pull(pin, resistor))
    }
}

#[derive(Debug)]
pub struct MockSystem {
    pub peripheral_hz: u32,
    pub fail: bool,
    pub powered: Mutex<Vec<PeripheralId>>,
}

impl MockSystem {
    pub fn new(peripheral_hz: u32) -> Self {
        Self {
            peripheral_hz,
            fail: false,
            powered: Mutex::new(Vec::new()),
        }
    }
}

impl SystemController for MockSystem {
    type Error = ();

    fn power_up(&self, peripheral: PeripheralId) -> Result<u32, ()> {
        if self.fail {
            return Err(());
        }
        let mut powered = self.powered.lock().unwrap();
        if !powered.contains(&peripheral) {
            powered.push(peripheral);
        }
        Ok(self.peripheral_hz)
    }

    fn is_powered(&self, peripheral: PeripheralId) -> bool {
        self.powered.lock().unwrap().contains(&peripheral)
    }
}

#[derive(Default)]
pub struct MockInterrupts {
    pub registered: Mutex<Vec<u16>>,
    pub fail: bool,
}

impl InterruptController for MockInterrupts {
    type Error = ();

    fn register(&self, irq: u16, _handler: &'static dyn InterruptHandler) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.registered.lock().unwrap().push(irq);
        Ok(())
    }
}
