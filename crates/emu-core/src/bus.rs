//! Memory bus interface.

use crate::{BusOperation, InterruptLines};

/// What a bus cycle is being used for.
///
/// Memory-mapped peripherals see every cycle the CPU issues, including the
/// ones whose value the CPU throws away, so the tag travels with the access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessKind {
    /// Opcode fetch, the first cycle of an instruction.
    ExecOpcode,
    /// Operand byte fetch from the instruction stream.
    ExecOperand,
    /// Data read.
    Read,
    /// Data write.
    Write,
    /// Read whose value the CPU discards.
    DummyRead,
    /// Write of the unmodified value during an NMOS read-modify-write.
    DummyWrite,
    /// Read performed by a DMA unit while the CPU is halted.
    DmaRead,
    /// Write performed by a DMA unit.
    DmaWrite,
}

impl AccessKind {
    /// True for cycles that drive the data bus from the CPU side.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write | Self::DummyWrite | Self::DmaWrite)
    }

    /// True for cycles whose value has no logical effect on the CPU.
    #[must_use]
    pub const fn is_dummy(self) -> bool {
        matches!(self, Self::DummyRead | Self::DummyWrite)
    }

    /// True for cycles stolen by a DMA unit.
    #[must_use]
    pub const fn is_dma(self) -> bool {
        matches!(self, Self::DmaRead | Self::DmaWrite)
    }
}

/// Memory and I/O bus interface.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding, mirroring and open-bus behavior; the CPU never
/// special-cases an address. One call is one CPU cycle, so a bus that owns
/// other chips advances them from inside `read` and `write`.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16, kind: AccessKind) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8, kind: AccessKind);

    /// Read a byte without side effects.
    ///
    /// Used by debuggers and by [`RecordingBus`](crate::RecordingBus). Must
    /// not clear latches, acknowledge interrupts or advance anything.
    fn peek(&self, address: u16) -> u8;

    /// Update the interrupt lines at the end of a CPU cycle.
    ///
    /// Called once per cycle after the access completes. Chips that drive
    /// NMI or IRQ set or clear their bits here.
    fn sync_interrupts(&mut self, lines: &mut InterruptLines) {
        let _ = lines;
    }
}

/// Flat 64 KiB RAM bus for tests.
///
/// Every access is appended to a history so tests can assert on exact
/// cycle sequences. Interrupt lines can be scheduled to assert from a given
/// access onwards, which is enough to exercise interrupt polling without a
/// real machine around the CPU.
pub struct SimpleBus {
    ram: Vec<u8>,
    history: Vec<BusOperation>,
    nmi_from: Option<usize>,
    irq_from: Option<(usize, u8)>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x1_0000],
            history: Vec::new(),
            nmi_from: None,
            irq_from: None,
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Set the little-endian word at `address`.
    pub fn set_word(&mut self, address: u16, value: u16) {
        self.load(address, &value.to_le_bytes());
    }

    /// Every access since the last [`clear_history`](Self::clear_history).
    #[must_use]
    pub fn history(&self) -> &[BusOperation] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Assert NMI at the end of history entry `access` (0-based) and after.
    pub fn assert_nmi_from(&mut self, access: usize) {
        self.nmi_from = Some(access);
    }

    /// Assert IRQ `sources` at the end of history entry `access` and after.
    pub fn assert_irq_from(&mut self, access: usize, sources: u8) {
        self.irq_from = Some((access, sources));
    }

    /// Drop any scheduled interrupt lines.
    pub fn release_interrupts(&mut self) {
        self.nmi_from = None;
        self.irq_from = None;
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16, kind: AccessKind) -> u8 {
        let value = self.ram[usize::from(address)];
        self.history.push(BusOperation::new(address, value, kind));
        value
    }

    fn write(&mut self, address: u16, value: u8, kind: AccessKind) {
        self.ram[usize::from(address)] = value;
        self.history.push(BusOperation::new(address, value, kind));
    }

    fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn sync_interrupts(&mut self, lines: &mut InterruptLines) {
        let done = self.history.len();
        if self.nmi_from.is_some_and(|at| done > at) {
            lines.nmi = true;
        }
        match self.irq_from {
            Some((at, sources)) if done > at => lines.irq |= sources,
            _ => {}
        }
    }
}
