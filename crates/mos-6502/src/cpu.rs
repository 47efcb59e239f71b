//! NMOS 6502 CPU core.
//!
//! One call to [`Mos6502::step`] runs one instruction. Every cycle of that
//! instruction is a single `read` or `write` on the bus, so the rest of the
//! machine can be advanced from inside the bus with cycle precision. The
//! interrupt lines are sampled at the end of every cycle and a pending DMA
//! transfer steals the bus at the next read cycle.

use emu_core::{AccessKind, Cpu, InterruptLines, RecordingBus, Trace};

use crate::dma::DmaState;
use crate::flags::I;
use crate::opcodes::{AddrMode, decode};
use crate::{DmaBus, DmaRequest, InterruptEdgeState, IrqSource, Registers, Variant};

/// NMI vector address.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector address.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ and BRK vector address.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// The NMOS 6502 and its Ricoh derivatives.
#[derive(Debug, Clone)]
pub struct Mos6502 {
    pub(crate) regs: Registers,
    pub(crate) variant: Variant,
    pub(crate) famicom_input: bool,
    irq_mask: u8,
    pub(crate) edge: InterruptEdgeState,
    pub(crate) dma: DmaState,

    /// Addressing mode of the instruction being executed.
    pub(crate) mode: AddrMode,
    /// Resolved operand: an effective address for memory modes, the
    /// immediate byte or branch offset otherwise.
    pub(crate) operand: u16,

    /// Locked up by a JAM opcode until reset.
    pub(crate) jammed: bool,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

impl Mos6502 {
    /// Create a CPU in the power-on register state.
    ///
    /// PC is 0 until [`power_on`](Self::power_on) or
    /// [`reset`](Self::reset) loads it from the reset vector; tests usually
    /// set it directly with [`set_registers`](Self::set_registers).
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            regs: Registers::new(),
            variant,
            famicom_input: false,
            irq_mask: 0xFF,
            edge: InterruptEdgeState::default(),
            dma: DmaState::default(),
            mode: AddrMode::None,
            operand: 0,
            jammed: false,
        }
    }

    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Execute one instruction, then the interrupt sequence if one is due.
    pub fn step<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        if self.jammed {
            self.dummy_read(bus);
            return;
        }

        let opcode = self.fetch_opcode(bus);
        let entry = decode(opcode);
        self.mode = entry.mode;
        self.operand = self.fetch_operand(bus);
        self.execute(bus, entry.op);

        if self.edge.interrupt_due() && !self.jammed {
            self.interrupt(bus);
        }
    }

    /// Predict the next [`step`](Self::step) without touching `self` or
    /// `bus`.
    ///
    /// Runs a copy of the CPU against a [`RecordingBus`]. A transfer that
    /// is already pending runs in the copy too; requests the bus would raise
    /// during the instruction are not seen.
    #[must_use]
    pub fn trace<B: DmaBus + ?Sized>(&self, bus: &B) -> Trace<Registers> {
        let mut shadow = self.clone();
        let mut recorder = RecordingBus::new(bus);
        shadow.step(&mut recorder);
        Trace {
            registers: shadow.regs,
            operations: recorder.into_log(),
        }
    }

    /// Cold start: clear the registers and run the reset sequence.
    pub fn power_on<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        // The three suppressed pushes of the reset sequence leave S at $FD.
        self.regs.s = 0x00;
        self.reset_sequence(bus);
    }

    /// Warm reset: keep A, X, Y and decrement S by three.
    pub fn reset<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        self.regs.lines = InterruptLines::default();
        self.reset_sequence(bus);
    }

    fn reset_sequence<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        self.dma = DmaState::default();
        self.edge = InterruptEdgeState::default();
        self.jammed = false;

        self.dummy_read(bus);
        self.dummy_read(bus);
        for _ in 0..3 {
            let address = self.regs.push();
            self.read(bus, address, AccessKind::DummyRead);
        }
        self.regs.p.set(I);
        self.regs.pc = self.read_word(bus, RESET_VECTOR, AccessKind::Read);
    }

    #[must_use]
    pub const fn registers(&self) -> Registers {
        self.regs
    }

    /// Replace the register file verbatim, e.g. from a save state.
    ///
    /// P is re-masked so the break bit is never stored.
    pub fn set_registers(&mut self, registers: Registers) {
        self.regs = registers;
        self.regs.p = crate::Status::from_byte(registers.p.0);
    }

    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.regs.cycles
    }

    /// True once a JAM opcode has locked the CPU.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.jammed
    }

    /// Interrupt detection state, for debuggers.
    #[must_use]
    pub const fn edge_state(&self) -> &InterruptEdgeState {
        &self.edge
    }

    /// Drive the NMI line. The CPU reacts to the low-to-high transition.
    pub fn set_nmi_line(&mut self, asserted: bool) {
        self.regs.lines.nmi = asserted;
    }

    /// Assert an IRQ source. It stays asserted until its owner clears it.
    pub fn set_irq_source(&mut self, source: IrqSource) {
        self.regs.lines.irq |= source.bit();
    }

    pub fn clear_irq_source(&mut self, source: IrqSource) {
        self.regs.lines.irq &= !source.bit();
    }

    #[must_use]
    pub const fn has_irq_source(&self, source: IrqSource) -> bool {
        self.regs.lines.irq & source.bit() != 0
    }

    /// Select which IRQ sources reach the CPU (one bit per [`IrqSource`]).
    pub fn set_irq_mask(&mut self, mask: u8) {
        self.irq_mask = mask;
    }

    /// Use Famicom controller-port behavior during DMA instead of the
    /// NES front-loader's.
    pub fn set_famicom_input_behavior(&mut self, famicom: bool) {
        self.famicom_input = famicom;
    }

    /// Queue a DMA transfer. It starts at the CPU's next read cycle.
    pub fn request_dma(&mut self, request: DmaRequest) {
        self.dma.post(request);
    }

    /// True while a DMA transfer waits for the CPU's next read cycle.
    #[must_use]
    pub const fn dma_pending(&self) -> bool {
        self.dma.is_pending()
    }

    /// One read cycle, preceded by any DMA that was waiting for it.
    pub(crate) fn read<B: DmaBus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u16,
        kind: AccessKind,
    ) -> u8 {
        self.process_pending_dma(bus, address);
        self.regs.cycles += 1;
        let value = bus.read(address, kind);
        self.end_cycle(bus);
        value
    }

    /// One write cycle. DMA never halts the CPU on a write.
    pub(crate) fn write<B: DmaBus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u16,
        value: u8,
        kind: AccessKind,
    ) {
        self.regs.cycles += 1;
        bus.write(address, value, kind);
        self.end_cycle(bus);
    }

    pub(crate) fn end_cycle<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        bus.sync_interrupts(&mut self.regs.lines);
        self.edge
            .end_cycle(self.regs.lines, self.irq_mask, self.regs.p.is_set(I));
        if let Some(request) = bus.take_dma_request() {
            self.dma.post(request);
        }
    }

    /// IRQ/NMI entry. An NMI that arrives before the flags are pushed takes
    /// over the sequence.
    fn interrupt<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        self.dummy_read(bus);
        self.dummy_read(bus);
        self.push_word(bus, self.regs.pc);

        let (vector, name) = if self.edge.take_nmi() {
            (NMI_VECTOR, "NMI")
        } else {
            (IRQ_VECTOR, "IRQ")
        };
        self.push(bus, self.regs.p.to_byte_irq());
        self.regs.p.set(I);
        let return_address = self.regs.pc;
        self.regs.pc = self.read_word(bus, vector, AccessKind::Read);
        log::trace!(
            "{name} from ${return_address:04X} to ${:04X}",
            self.regs.pc
        );
    }

    pub(crate) fn push<B: DmaBus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        let address = self.regs.push();
        self.write(bus, address, value, AccessKind::Write);
    }

    pub(crate) fn push_word<B: DmaBus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    pub(crate) fn pop<B: DmaBus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let address = self.regs.pop();
        self.read(bus, address, AccessKind::Read)
    }

    pub(crate) fn pop_word<B: DmaBus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }
}

impl<B: DmaBus> Cpu<B> for Mos6502 {
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
        self.jammed
    }

    fn reset(&mut self, bus: &mut B) {
        Self::reset(self, bus);
    }
}
