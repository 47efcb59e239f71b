//! Addressing-mode resolution.
//!
//! Each mode issues the same bus cycles the chip does, dummy reads
//! included, because memory-mapped registers react to them.

use emu_core::AccessKind;

use crate::opcodes::AddrMode;
use crate::{DmaBus, Mos6502};

impl Mos6502 {
    pub(crate) fn fetch_opcode<B: DmaBus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let opcode = self.read(bus, self.regs.pc, AccessKind::ExecOpcode);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        opcode
    }

    pub(crate) fn fetch_byte<B: DmaBus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = self.read(bus, self.regs.pc, AccessKind::ExecOperand);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub(crate) fn fetch_word<B: DmaBus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Read the byte after the opcode and throw it away.
    pub(crate) fn dummy_read<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        self.read(bus, self.regs.pc, AccessKind::DummyRead);
    }

    pub(crate) fn read_word<B: DmaBus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u16,
        kind: AccessKind,
    ) -> u16 {
        let lo = self.read(bus, address, kind);
        let hi = self.read(bus, address.wrapping_add(1), kind);
        u16::from_le_bytes([lo, hi])
    }

    /// Pointer stored in page zero. The high byte of a pointer at $FF comes
    /// from $00.
    pub(crate) fn read_zero_page_word<B: DmaBus + ?Sized>(
        &mut self,
        bus: &mut B,
        pointer: u8,
    ) -> u16 {
        let lo = self.read(bus, u16::from(pointer), AccessKind::Read);
        let hi = self.read(bus, u16::from(pointer.wrapping_add(1)), AccessKind::Read);
        u16::from_le_bytes([lo, hi])
    }

    /// Resolve the current instruction's operand.
    pub(crate) fn fetch_operand<B: DmaBus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        match self.mode {
            AddrMode::Acc | AddrMode::Imp => {
                self.dummy_read(bus);
                0
            }
            AddrMode::Imm | AddrMode::Rel | AddrMode::Zero => u16::from(self.fetch_byte(bus)),
            AddrMode::ZeroX => self.zero_page_indexed(bus, self.regs.x),
            AddrMode::ZeroY => self.zero_page_indexed(bus, self.regs.y),
            AddrMode::Abs => self.fetch_word(bus),
            AddrMode::Ind => {
                let pointer = self.fetch_word(bus);
                self.jump_indirect_target(bus, pointer)
            }
            AddrMode::IndX => {
                let base = self.fetch_byte(bus);
                self.read(bus, u16::from(base), AccessKind::DummyRead);
                self.read_zero_page_word(bus, base.wrapping_add(self.regs.x))
            }
            AddrMode::IndY | AddrMode::IndYW => {
                let pointer = self.fetch_byte(bus);
                let base = self.read_zero_page_word(bus, pointer);
                self.indexed(bus, base, self.regs.y, self.mode == AddrMode::IndYW)
            }
            AddrMode::AbsX | AddrMode::AbsXW => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.x, self.mode == AddrMode::AbsXW)
            }
            AddrMode::AbsY | AddrMode::AbsYW => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.y, self.mode == AddrMode::AbsYW)
            }
            AddrMode::None | AddrMode::Other => 0,
        }
    }

    fn zero_page_indexed<B: DmaBus + ?Sized>(&mut self, bus: &mut B, index: u8) -> u16 {
        let base = self.fetch_byte(bus);
        self.read(bus, u16::from(base), AccessKind::DummyRead);
        u16::from(base.wrapping_add(index))
    }

    /// `base + index`, with a dummy read at the address before the carry
    /// into the high byte. Reads skip it when there is no carry; stores and
    /// read-modify-writes always take it.
    pub(crate) fn indexed<B: DmaBus + ?Sized>(
        &mut self,
        bus: &mut B,
        base: u16,
        index: u8,
        always: bool,
    ) -> u16 {
        let address = base.wrapping_add(u16::from(index));
        let page_crossed = (base ^ address) & 0xFF00 != 0;
        if page_crossed || always {
            self.read(bus, (base & 0xFF00) | (address & 0x00FF), AccessKind::DummyRead);
        }
        address
    }

    /// `JMP ($xxFF)` takes its high byte from `$xx00`.
    fn jump_indirect_target<B: DmaBus + ?Sized>(&mut self, bus: &mut B, pointer: u16) -> u16 {
        let lo = self.read(bus, pointer, AccessKind::Read);
        let hi_address = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
        let hi = self.read(bus, hi_address, AccessKind::Read);
        u16::from_le_bytes([lo, hi])
    }

    /// The operand as a value: read from memory for memory modes.
    pub(crate) fn operand_value<B: DmaBus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        if self.mode.is_memory() {
            self.read(bus, self.operand, AccessKind::Read)
        } else {
            self.operand as u8
        }
    }
}
