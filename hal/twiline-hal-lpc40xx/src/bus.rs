//! Per-controller state shared with the interrupt handler
//!
//! Each I2C controller has exactly one [`Bus`]. It holds the register block,
//! the board wiring, and the slot the in-flight transaction lives in while
//! the interrupt handler drives it.
//!
//! # Sharing
//!
//! The slot is written from two contexts. Every access claims it first
//! through an atomic flag, so at most one `&mut` to it exists at a time:
//!
//! - The foreground claims it inside a critical section, to attach a
//!   transaction, to mark it timed out, and to detach it.
//! - The interrupt handler claims it for the length of one interrupt. If the
//!   slot is already claimed (a nested call, or another core in the middle
//!   of an access) it returns without touching the controller. The interrupt
//!   flag stays set, so the line fires again once the slot is free.
//!
//! The busy flag is mirrored in an atomic so the foreground can poll it
//! without masking interrupts.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use heapless::{HistoryBuffer, Vec};
use twiline_core::{service, Control, Response, Transaction, TransactionInfo};
use twiline_hal::{InterruptHandler, PeripheralId, PinId};

use crate::registers::{Mmio, Registers, I2C0_BASE, I2C1_BASE, I2C2_BASE};

/// Number of interrupts remembered by [`Bus::trace`]
pub const TRACE_DEPTH: usize = 16;

/// How one controller is wired on the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    /// Power control bit
    pub peripheral: PeripheralId,
    /// Interrupt line
    pub irq: u16,
    /// Data pin
    pub sda: PinId,
    /// Clock pin
    pub scl: PinId,
    /// I/O configuration function selecting I2C on both pins
    pub pin_function: u8,
}

impl Descriptor {
    /// I2C0 on P0.0 (SDA) / P0.1 (SCL)
    pub const I2C0: Self = Self {
        peripheral: PeripheralId(7),
        irq: 10,
        sda: PinId::new(0, 0),
        scl: PinId::new(0, 1),
        pin_function: 0b010,
    };

    /// I2C1 on P1.30 (SDA) / P1.31 (SCL)
    pub const I2C1: Self = Self {
        peripheral: PeripheralId(19),
        irq: 11,
        sda: PinId::new(1, 30),
        scl: PinId::new(1, 31),
        pin_function: 0b011,
    };

    /// I2C2 on P0.10 (SDA) / P0.11 (SCL)
    pub const I2C2: Self = Self {
        peripheral: PeripheralId(26),
        irq: 12,
        sda: PinId::new(0, 10),
        scl: PinId::new(0, 11),
        pin_function: 0b010,
    };
}

/// One serviced interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TraceEntry {
    /// Status code the handler saw
    pub state: u8,
    /// What the handler did about it
    pub response: Response,
}

struct Slot {
    transaction: Option<Transaction<'static>>,
    trace: HistoryBuffer<TraceEntry, TRACE_DEPTH>,
}

/// Exclusive access to a claimed slot, released on drop
struct SlotRef<'b> {
    slot: &'b mut Slot,
    claimed: &'b AtomicBool,
}

impl Drop for SlotRef<'_> {
    fn drop(&mut self) {
        self.claimed.store(false, Ordering::Release);
    }
}

impl Deref for SlotRef<'_> {
    type Target = Slot;

    fn deref(&self) -> &Slot {
        self.slot
    }
}

impl DerefMut for SlotRef<'_> {
    fn deref_mut(&mut self) -> &mut Slot {
        self.slot
    }
}

/// Driver state for one I2C controller
pub struct Bus<R> {
    registers: R,
    descriptor: Descriptor,
    slot: UnsafeCell<Slot>,
    claimed: AtomicBool,
    busy: AtomicBool,
}

// SAFETY: the slot is only reached through `SlotRef`, which the `claimed`
// flag keeps unique. The register block is only reached through `&R` with
// `R: Sync`.
unsafe impl<R: Sync> Sync for Bus<R> {}

impl<R> Bus<R> {
    /// Create the state for one controller
    pub const fn new(registers: R, descriptor: Descriptor) -> Self {
        Self {
            registers,
            descriptor,
            slot: UnsafeCell::new(Slot {
                transaction: None,
                trace: HistoryBuffer::new(),
            }),
            claimed: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    /// Claim the slot unless someone else holds it
    fn try_claim(&self) -> Option<SlotRef<'_>> {
        if self.claimed.swap(true, Ordering::Acquire) {
            return None;
        }
        // SAFETY: the swap above ensures no other `SlotRef` exists
        let slot = unsafe { &mut *self.slot.get() };
        Some(SlotRef {
            slot,
            claimed: &self.claimed,
        })
    }

    /// Claim the slot from the foreground
    ///
    /// Callers hold a critical section, so on a single core the interrupt
    /// handler cannot be holding the claim. Elsewhere this waits for the
    /// handler to finish its interrupt.
    fn claim(&self) -> SlotRef<'_> {
        loop {
            if let Some(slot) = self.try_claim() {
                return slot;
            }
            core::hint::spin_loop();
        }
    }

    /// Register block
    pub fn registers(&self) -> &R {
        &self.registers
    }

    /// Board wiring
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Whether a transaction is attached and still running
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// The most recent interrupts, oldest first
    ///
    /// Returns `None` if called while the interrupt handler is running.
    pub fn trace(&self) -> Option<Vec<TraceEntry, TRACE_DEPTH>> {
        critical_section::with(|_| {
            let slot = self.try_claim()?;
            let entries = slot.trace.oldest_ordered().copied().collect();
            Some(entries)
        })
    }

    fn attach(&self, mut txn: Transaction<'static>) {
        critical_section::with(|_| {
            let mut slot = self.claim();
            txn.begin();
            slot.transaction = Some(txn);
            self.busy.store(true, Ordering::Release);
        });
    }

    fn detach(&self) -> Option<TransactionInfo> {
        critical_section::with(|_| {
            let mut slot = self.claim();
            self.busy.store(false, Ordering::Release);
            let info = slot.transaction.take().map(|txn| txn.info());
            info
        })
    }

    /// Give up on the attached transaction
    ///
    /// Returns whether it was a write-then-read, the only shape left with a
    /// half-finished read that the abort cuts short.
    pub(crate) fn time_out(&self) -> bool {
        critical_section::with(|_| {
            let mut slot = self.claim();
            self.busy.store(false, Ordering::Release);
            let multi_phase = match slot.transaction.as_mut() {
                Some(txn) => {
                    txn.time_out();
                    txn.is_multi_phase()
                }
                None => false,
            };
            multi_phase
        })
    }

    /// Attach `txn`, run `wait`, then detach it again
    ///
    /// The transaction is detached on every exit path, including unwinding
    /// out of `wait`, so the interrupt handler never sees the caller's
    /// buffers once this returns.
    pub(crate) fn execute<'a, T>(
        &self,
        txn: Transaction<'a>,
        wait: impl FnOnce(&Self) -> T,
    ) -> (TransactionInfo, T) {
        let fallback = txn.info();

        // SAFETY: only the lifetime changes. The erased borrow is dropped by
        // `Attached` before `'a` ends.
        let txn = unsafe { core::mem::transmute::<Transaction<'a>, Transaction<'static>>(txn) };
        self.attach(txn);

        let attached = Attached { bus: self };
        let output = wait(self);
        let info = attached.release();
        (info.unwrap_or(fallback), output)
    }
}

impl<R: Registers> Bus<R> {
    /// Service one interrupt
    ///
    /// Does nothing if the slot is already claimed; see the module docs.
    pub fn on_interrupt(&self) {
        let Some(mut slot) = self.try_claim() else {
            return;
        };

        let state = self.registers.status();
        let received = self.registers.data();

        let (response, finished) = match slot.transaction.as_mut() {
            Some(txn) => {
                let response = service(txn, state, received);
                #[cfg(feature = "defmt")]
                {
                    if let twiline_core::Status::InternalFatal { state } = txn.status() {
                        defmt::error!("I2C status {=u8:#x} has no handler", state);
                    }
                }
                (response, !txn.is_busy())
            }
            // Nobody is waiting; release the bus
            None => (
                Response {
                    set: Control::STOP,
                    clear: Control::START,
                    transmit: None,
                },
                false,
            ),
        };

        if let Some(byte) = response.transmit {
            self.registers.write_data(byte);
        }
        if !response.set.is_empty() {
            self.registers.set_control(response.set);
        }
        self.registers.clear_control(response.clear | Control::INTERRUPT);

        slot.trace.write(TraceEntry { state, response });

        if finished {
            self.busy.store(false, Ordering::Release);
        }
    }
}

impl<R: Registers + Sync> InterruptHandler for Bus<R> {
    fn on_interrupt(&self) {
        Bus::on_interrupt(self)
    }
}

/// Detaches on drop
struct Attached<'b, R> {
    bus: &'b Bus<R>,
}

impl<R> Attached<'_, R> {
    fn release(self) -> Option<TransactionInfo> {
        let info = self.bus.detach();
        core::mem::forget(self);
        info
    }
}

impl<R> Drop for Attached<'_, R> {
    fn drop(&mut self) {
        self.bus.detach();
    }
}

/// Handle naming one of the controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusId {
    /// I2C0
    I2c0 = 0,
    /// I2C1
    I2c1 = 1,
    /// I2C2
    I2c2 = 2,
}

/// Every controller on the chip, indexed by [`BusId`]
// SAFETY: the bases are the datasheet addresses of the three blocks, and
// each is wrapped exactly once.
pub static BUSES: [Bus<Mmio>; 3] = unsafe {
    [
        Bus::new(Mmio::new(I2C0_BASE), Descriptor::I2C0),
        Bus::new(Mmio::new(I2C1_BASE), Descriptor::I2C1),
        Bus::new(Mmio::new(I2C2_BASE), Descriptor::I2C2),
    ]
};

/// The state for controller `id`
pub fn bus(id: BusId) -> &'static Bus<Mmio> {
    &BUSES[id as usize]
}
