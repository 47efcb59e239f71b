//! Recording bus for side-effect-free instruction traces.

use crate::{AccessKind, Bus};

/// Maximum number of bus operations kept per traced instruction.
///
/// The longest 6502-family instruction plus an interrupt entry that follows
/// it stays well below this.
pub const TRACE_CAPACITY: usize = 32;

/// One bus cycle: where, what, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusOperation {
    pub address: u16,
    pub value: u8,
    pub kind: AccessKind,
}

impl BusOperation {
    const EMPTY: Self = Self::new(0, 0, AccessKind::Read);

    #[must_use]
    pub const fn new(address: u16, value: u8, kind: AccessKind) -> Self {
        Self {
            address,
            value,
            kind,
        }
    }
}

/// Fixed-capacity, ordered log of bus operations.
///
/// Fixed size to avoid allocation. Once full, further operations are
/// dropped and counted rather than overwriting the start of the
/// instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusLog {
    ops: [BusOperation; TRACE_CAPACITY],
    len: usize,
    dropped: usize,
}

impl Default for BusLog {
    fn default() -> Self {
        Self::new()
    }
}

impl BusLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: [BusOperation::EMPTY; TRACE_CAPACITY],
            len: 0,
            dropped: 0,
        }
    }

    pub fn push(&mut self, op: BusOperation) {
        if self.len < TRACE_CAPACITY {
            self.ops[self.len] = op;
            self.len += 1;
        } else {
            if self.dropped == 0 {
                log::debug!(
                    "bus log full, dropping operations from ${:04X}",
                    op.address
                );
            }
            self.dropped += 1;
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[BusOperation] {
        &self.ops[..self.len]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Operations that did not fit.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }
}

/// Bus strategy that logs instead of touching hardware.
///
/// Reads are answered from the wrapped bus through [`Bus::peek`], so the
/// decode logic sees real memory contents without triggering side effects.
/// Writes never reach the wrapped bus, but a later read of the same address
/// sees the last value written. Interrupt lines are never updated, so a
/// trace sees the lines as they were when it started.
pub struct RecordingBus<'a, B: Bus + ?Sized> {
    bus: &'a B,
    log: BusLog,
}

impl<'a, B: Bus + ?Sized> RecordingBus<'a, B> {
    #[must_use]
    pub const fn new(bus: &'a B) -> Self {
        Self {
            bus,
            log: BusLog::new(),
        }
    }

    #[must_use]
    pub const fn log(&self) -> &BusLog {
        &self.log
    }

    #[must_use]
    pub fn into_log(self) -> BusLog {
        self.log
    }

    /// The bus being recorded.
    #[must_use]
    pub const fn inner(&self) -> &'a B {
        self.bus
    }

    /// Newest logged write to `address`, else the wrapped bus. Writes past
    /// the log capacity are not seen.
    fn value_at(&self, address: u16) -> u8 {
        self.log
            .as_slice()
            .iter()
            .rev()
            .find(|op| op.kind.is_write() && op.address == address)
            .map_or_else(|| self.bus.peek(address), |op| op.value)
    }
}

impl<B: Bus + ?Sized> Bus for RecordingBus<'_, B> {
    fn read(&mut self, address: u16, kind: AccessKind) -> u8 {
        let value = self.value_at(address);
        self.log.push(BusOperation::new(address, value, kind));
        value
    }

    fn write(&mut self, address: u16, value: u8, kind: AccessKind) {
        self.log.push(BusOperation::new(address, value, kind));
    }

    fn peek(&self, address: u16) -> u8 {
        self.value_at(address)
    }
}
