//! CPU core trait.

use crate::{AccessKind, Bus, BusLog, BusOperation};

/// What one instruction would do, computed without touching the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<R> {
    /// Register file after the instruction (and any interrupt entry it
    /// triggers).
    pub registers: R,
    /// Bus operations in issue order.
    pub operations: BusLog,
}

impl<R> Trace<R> {
    #[must_use]
    pub fn operations(&self) -> &[BusOperation] {
        self.operations.as_slice()
    }

    /// Opcode and operand bytes in fetch order.
    pub fn fetched_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.operations()
            .iter()
            .filter(|op| matches!(op.kind, AccessKind::ExecOpcode | AccessKind::ExecOperand))
            .map(|op| op.value)
    }

    /// Data reads and writes the instruction performs, dummy cycles
    /// excluded.
    pub fn data_accesses(&self) -> impl Iterator<Item = &BusOperation> + '_ {
        self.operations()
            .iter()
            .filter(|op| matches!(op.kind, AccessKind::Read | AccessKind::Write))
    }
}

/// A CPU core.
///
/// `step` and `trace` run the same decode/execute code: `step` against the
/// live bus, `trace` against a [`RecordingBus`](crate::RecordingBus) on a
/// copy of the CPU. The bus is passed in, not owned, so it can be shared
/// with the other chips in the machine.
pub trait Cpu<B: Bus> {
    /// Register snapshot type.
    type Registers;

    /// Execute exactly one instruction, plus any interrupt entry or DMA
    /// stall that falls inside it.
    fn step(&mut self, bus: &mut B);

    /// Predict what `step` would do without changing the CPU or the bus.
    fn trace(&self, bus: &B) -> Trace<Self::Registers>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Total CPU cycles executed.
    fn cycles(&self) -> u64;

    /// Returns a snapshot of all registers.
    fn registers(&self) -> Self::Registers;

    /// Overwrite the register file, e.g. when restoring a save state.
    fn set_registers(&mut self, registers: Self::Registers);

    /// Returns true if the CPU has stopped fetching instructions.
    fn is_halted(&self) -> bool;

    /// Run the reset sequence.
    fn reset(&mut self, bus: &mut B);
}
