//! Addressing-mode resolution with Lynx bus timing.
//!
//! Idle cycles read the byte at PC, not the partially computed address the
//! NMOS part puts on the bus.

use emu_core::{AccessKind, Bus};

use crate::Wdc65c02;
use crate::opcodes::AddrMode;

impl Wdc65c02 {
    pub(crate) fn fetch_opcode<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let opcode = self.read(bus, self.regs.pc, AccessKind::ExecOpcode);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        opcode
    }

    pub(crate) fn fetch_byte<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = self.read(bus, self.regs.pc, AccessKind::ExecOperand);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn fetch_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn dummy_read<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.read(bus, self.regs.pc, AccessKind::DummyRead);
    }

    pub(crate) fn read_word<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16) -> u16 {
        let lo = self.read(bus, address, AccessKind::Read);
        let hi = self.read(bus, address.wrapping_add(1), AccessKind::Read);
        u16::from_le_bytes([lo, hi])
    }

    fn read_zero_page_word<B: Bus + ?Sized>(&mut self, bus: &mut B, pointer: u8) -> u16 {
        let lo = self.read(bus, u16::from(pointer), AccessKind::Read);
        let hi = self.read(bus, u16::from(pointer.wrapping_add(1)), AccessKind::Read);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn fetch_operand<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        match self.mode {
            AddrMode::None => 0,
            AddrMode::Acc | AddrMode::Imp => {
                self.dummy_read(bus);
                0
            }
            AddrMode::Imm | AddrMode::Rel | AddrMode::Zero => u16::from(self.fetch_byte(bus)),
            AddrMode::ZeroX => self.zero_page_indexed(bus, self.regs.x),
            AddrMode::ZeroY => self.zero_page_indexed(bus, self.regs.y),
            AddrMode::Abs => self.fetch_word(bus),
            AddrMode::AbsX | AddrMode::AbsXW => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.x, self.mode == AddrMode::AbsXW)
            }
            AddrMode::AbsY | AddrMode::AbsYW => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.y, self.mode == AddrMode::AbsYW)
            }
            AddrMode::Ind => {
                let pointer = self.fetch_word(bus);
                self.read_word(bus, pointer)
            }
            AddrMode::IndX => {
                let base = self.fetch_byte(bus);
                self.dummy_read(bus);
                self.read_zero_page_word(bus, base.wrapping_add(self.regs.x))
            }
            AddrMode::IndY | AddrMode::IndYW => {
                let pointer = self.fetch_byte(bus);
                let base = self.read_zero_page_word(bus, pointer);
                self.indexed(bus, base, self.regs.y, self.mode == AddrMode::IndYW)
            }
            AddrMode::ZeroInd => {
                let pointer = self.fetch_byte(bus);
                self.read_zero_page_word(bus, pointer)
            }
            AddrMode::AbsIndX => {
                let base = self.fetch_word(bus);
                self.dummy_read(bus);
                self.read_word(bus, base.wrapping_add(u16::from(self.regs.x)))
            }
        }
    }

    fn zero_page_indexed<B: Bus + ?Sized>(&mut self, bus: &mut B, index: u8) -> u16 {
        let base = self.fetch_byte(bus);
        self.dummy_read(bus);
        u16::from(base.wrapping_add(index))
    }

    /// `base + index`, with an idle cycle on a carry into the high byte (or
    /// always, for the write variants).
    fn indexed<B: Bus + ?Sized>(&mut self, bus: &mut B, base: u16, index: u8, always: bool) -> u16 {
        let address = base.wrapping_add(u16::from(index));
        if always || (base ^ address) & 0xFF00 != 0 {
            self.dummy_read(bus);
        }
        address
    }

    pub(crate) fn operand_value<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        if self.mode.is_memory() {
            self.read(bus, self.operand, AccessKind::Read)
        } else {
            self.operand as u8
        }
    }
}
