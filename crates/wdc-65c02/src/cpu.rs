//! 65C02 CPU core.
//!
//! Same execution model as the NMOS core: one `step` is one instruction,
//! one bus call is one cycle. There is no DMA unit and no branch IRQ
//! quirk. IRQ is a level polled at the end of each instruction; NMI is
//! edge-detected every cycle.

use emu_core::{AccessKind, Bus, Cpu, InterruptLines, RecordingBus, Trace};
use mos_6502::flags::{D, I};
use mos_6502::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR, Registers, Status};

use crate::opcodes::{AddrMode, decode};

/// IRQ bit driven by [`Wdc65c02::set_irq_line`]. Buses that own other
/// interrupt sources use the remaining bits through
/// [`Bus::sync_interrupts`].
pub const IRQ_LINE: u8 = 0x01;

/// Whether the core is fetching instructions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopState {
    #[default]
    Running,
    /// After WAI, until an interrupt arrives.
    WaitingForIrq,
    /// After STP, until reset.
    Stopped,
}

/// The CMOS 65C02.
#[derive(Debug, Clone)]
pub struct Wdc65c02 {
    pub(crate) regs: Registers,
    pub(crate) stop: StopState,
    prev_nmi_line: bool,
    nmi_pending: bool,

    pub(crate) mode: AddrMode,
    pub(crate) operand: u16,
}

impl Default for Wdc65c02 {
    fn default() -> Self {
        Self::new()
    }
}

impl Wdc65c02 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            stop: StopState::Running,
            prev_nmi_line: false,
            nmi_pending: false,
            mode: AddrMode::None,
            operand: 0,
        }
    }

    /// Execute one instruction, then the interrupt sequence if one is due.
    ///
    /// While waiting (WAI) or stopped (STP) a step is a single idle cycle.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        match self.stop {
            StopState::Stopped => {
                self.dummy_read(bus);
                return;
            }
            StopState::WaitingForIrq => {
                self.dummy_read(bus);
                if self.interrupt_due() {
                    self.stop = StopState::Running;
                    self.interrupt(bus);
                }
                return;
            }
            StopState::Running => {}
        }

        let opcode = self.fetch_opcode(bus);
        let entry = decode(opcode);
        self.mode = entry.mode;
        self.operand = self.fetch_operand(bus);
        self.execute(bus, entry.op);

        if self.stop == StopState::Running && self.interrupt_due() {
            self.interrupt(bus);
        }
    }

    /// Predict the next [`step`](Self::step) without touching `self` or
    /// `bus`.
    #[must_use]
    pub fn trace<B: Bus + ?Sized>(&self, bus: &B) -> Trace<Registers> {
        let mut shadow = self.clone();
        let mut recorder = RecordingBus::new(bus);
        shadow.step(&mut recorder);
        Trace {
            registers: shadow.regs,
            operations: recorder.into_log(),
        }
    }

    /// Cold start: clear the registers and run the reset sequence.
    pub fn power_on<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        self.regs.s = 0x00;
        self.reset_sequence(bus);
    }

    /// Warm reset: keep A, X, Y and decrement S by three.
    pub fn reset<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.regs.lines = InterruptLines::default();
        self.reset_sequence(bus);
    }

    fn reset_sequence<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.stop = StopState::Running;
        self.prev_nmi_line = false;
        self.nmi_pending = false;

        self.dummy_read(bus);
        self.dummy_read(bus);
        for _ in 0..3 {
            let address = self.regs.push();
            self.read(bus, address, AccessKind::DummyRead);
        }
        self.regs.p.set(I);
        self.regs.p.clear(D);
        self.regs.pc = self.read_word(bus, RESET_VECTOR);
    }

    #[must_use]
    pub const fn registers(&self) -> Registers {
        self.regs
    }

    /// Replace the register file verbatim. P is re-masked so the break bit
    /// is never stored.
    pub fn set_registers(&mut self, registers: Registers) {
        self.regs = registers;
        self.regs.p = Status::from_byte(registers.p.0);
    }

    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.regs.cycles
    }

    #[must_use]
    pub const fn stop_state(&self) -> StopState {
        self.stop
    }

    /// True after STP. A core waiting in WAI still reacts to interrupts
    /// and is not halted.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.stop, StopState::Stopped)
    }

    pub fn set_nmi_line(&mut self, asserted: bool) {
        self.regs.lines.nmi = asserted;
    }

    /// Drive the external IRQ line. It stays asserted until cleared.
    pub fn set_irq_line(&mut self, asserted: bool) {
        if asserted {
            self.regs.lines.irq |= IRQ_LINE;
        } else {
            self.regs.lines.irq &= !IRQ_LINE;
        }
    }

    /// True if an NMI edge has been seen and not yet serviced.
    #[must_use]
    pub const fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    fn interrupt_due(&self) -> bool {
        self.nmi_pending || (self.regs.lines.irq != 0 && !self.regs.p.is_set(I))
    }

    pub(crate) fn read<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u16,
        kind: AccessKind,
    ) -> u8 {
        self.regs.cycles += 1;
        let value = bus.read(address, kind);
        self.end_cycle(bus);
        value
    }

    pub(crate) fn write<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.regs.cycles += 1;
        bus.write(address, value, AccessKind::Write);
        self.end_cycle(bus);
    }

    fn end_cycle<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        bus.sync_interrupts(&mut self.regs.lines);
        let nmi = self.regs.lines.nmi;
        if nmi && !self.prev_nmi_line {
            self.nmi_pending = true;
        }
        self.prev_nmi_line = nmi;
    }

    /// IRQ/NMI entry. Unlike BRK on the NMOS part, the vector is fixed by
    /// the time the sequence starts.
    fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let nmi = std::mem::take(&mut self.nmi_pending);
        let (vector, name) = if nmi {
            (NMI_VECTOR, "NMI")
        } else {
            (IRQ_VECTOR, "IRQ")
        };

        self.dummy_read(bus);
        self.dummy_read(bus);
        self.push_word(bus, self.regs.pc);
        self.push(bus, self.regs.p.to_byte_irq());
        self.regs.p.set(I);
        self.regs.p.clear(D);
        let return_address = self.regs.pc;
        self.regs.pc = self.read_word(bus, vector);
        log::trace!(
            "{name} from ${return_address:04X} to ${:04X}",
            self.regs.pc
        );
    }

    pub(crate) fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        let address = self.regs.push();
        self.write(bus, address, value);
    }

    pub(crate) fn push_word<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    pub(crate) fn pop<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let address = self.regs.pop();
        self.read(bus, address, AccessKind::Read)
    }

    pub(crate) fn pop_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }
}

impl<B: Bus> Cpu<B> for Wdc65c02 {
    type Registers = Registers;

    fn step(&mut self, bus: &mut B) {
        Self::step(self, bus);
    }

    fn trace(&self, bus: &B) -> Trace<Registers> {
        Self::trace(self, bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn cycles(&self) -> u64 {
        self.regs.cycles
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn set_registers(&mut self, registers: Registers) {
        Self::set_registers(self, registers);
    }

    fn is_halted(&self) -> bool {
        self.stop == StopState::Stopped
    }

    fn reset(&mut self, bus: &mut B) {
        Self::reset(self, bus);
    }
}
