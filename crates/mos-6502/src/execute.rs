//! Instruction handlers.
//!
//! The addressing mode has already been resolved into `self.operand` when
//! these run. Handlers that need the operand as a value call
//! `operand_value`, which is where the data read cycle happens.

use emu_core::AccessKind;

use crate::alu::{self, AluResult};
use crate::cpu::{IRQ_VECTOR, NMI_VECTOR};
use crate::flags::{C, D, I, N, V, Z};
use crate::opcodes::Op;
use crate::{DmaBus, Mos6502, Status};

impl Mos6502 {
    pub(crate) fn execute<B: DmaBus + ?Sized>(&mut self, bus: &mut B, op: Op) {
        match op {
            // Loads and stores
            Op::Lda => {
                let value = self.operand_value(bus);
                self.set_a(value);
            }
            Op::Ldx => {
                let value = self.operand_value(bus);
                self.set_x(value);
            }
            Op::Ldy => {
                let value = self.operand_value(bus);
                self.set_y(value);
            }
            Op::Sta => self.store(bus, self.regs.a),
            Op::Stx => self.store(bus, self.regs.x),
            Op::Sty => self.store(bus, self.regs.y),

            // Transfers
            Op::Tax => self.set_x(self.regs.a),
            Op::Tay => self.set_y(self.regs.a),
            Op::Tsx => self.set_x(self.regs.s),
            Op::Txa => self.set_a(self.regs.x),
            Op::Txs => self.regs.s = self.regs.x,
            Op::Tya => self.set_a(self.regs.y),

            // Stack
            Op::Pha => self.push(bus, self.regs.a),
            Op::Php => self.push(bus, self.regs.p.to_byte_brk()),
            Op::Pla => {
                self.stack_dummy_read(bus);
                let value = self.pop(bus);
                self.set_a(value);
            }
            Op::Plp => {
                self.stack_dummy_read(bus);
                let value = self.pop(bus);
                self.regs.p = Status::from_byte(value);
            }

            // Arithmetic and logic
            Op::Adc => {
                let value = self.operand_value(bus);
                self.adc(value);
            }
            Op::Sbc => {
                let value = self.operand_value(bus);
                self.sbc(value);
            }
            Op::And => {
                let value = self.operand_value(bus);
                self.set_a(self.regs.a & value);
            }
            Op::Ora => {
                let value = self.operand_value(bus);
                self.set_a(self.regs.a | value);
            }
            Op::Eor => {
                let value = self.operand_value(bus);
                self.set_a(self.regs.a ^ value);
            }
            Op::Bit => {
                let value = self.operand_value(bus);
                self.regs.p.assign(N | V | Z, alu::bit(self.regs.a, value));
            }
            Op::Cmp => self.compare(bus, self.regs.a),
            Op::Cpx => self.compare(bus, self.regs.x),
            Op::Cpy => self.compare(bus, self.regs.y),

            // Increments, decrements, shifts
            Op::Inc => self.modify(bus, |cpu, value| cpu.apply(N | Z, alu::inc(value))),
            Op::Dec => self.modify(bus, |cpu, value| cpu.apply(N | Z, alu::dec(value))),
            Op::Inx => self.set_x(self.regs.x.wrapping_add(1)),
            Op::Iny => self.set_y(self.regs.y.wrapping_add(1)),
            Op::Dex => self.set_x(self.regs.x.wrapping_sub(1)),
            Op::Dey => self.set_y(self.regs.y.wrapping_sub(1)),
            Op::AslAcc => self.accumulator(|_, value| alu::asl(value)),
            Op::LsrAcc => self.accumulator(|_, value| alu::lsr(value)),
            Op::RolAcc => self.accumulator(|carry, value| alu::rol(value, carry)),
            Op::RorAcc => self.accumulator(|carry, value| alu::ror(value, carry)),
            Op::AslMem => self.modify(bus, |cpu, value| cpu.apply(N | Z | C, alu::asl(value))),
            Op::LsrMem => self.modify(bus, |cpu, value| cpu.apply(N | Z | C, alu::lsr(value))),
            Op::RolMem => self.modify(bus, |cpu, value| {
                let carry = cpu.regs.p.is_set(C);
                cpu.apply(N | Z | C, alu::rol(value, carry))
            }),
            Op::RorMem => self.modify(bus, |cpu, value| {
                let carry = cpu.regs.p.is_set(C);
                cpu.apply(N | Z | C, alu::ror(value, carry))
            }),

            // Branches
            Op::Bcc => self.branch(bus, !self.regs.p.is_set(C)),
            Op::Bcs => self.branch(bus, self.regs.p.is_set(C)),
            Op::Beq => self.branch(bus, self.regs.p.is_set(Z)),
            Op::Bmi => self.branch(bus, self.regs.p.is_set(N)),
            Op::Bne => self.branch(bus, !self.regs.p.is_set(Z)),
            Op::Bpl => self.branch(bus, !self.regs.p.is_set(N)),
            Op::Bvc => self.branch(bus, !self.regs.p.is_set(V)),
            Op::Bvs => self.branch(bus, self.regs.p.is_set(V)),

            // Jumps and returns
            Op::Jmp => self.regs.pc = self.operand,
            Op::Jsr => self.jsr(bus),
            Op::Rts => {
                self.stack_dummy_read(bus);
                let address = self.pop_word(bus);
                self.read(bus, address, AccessKind::DummyRead);
                self.regs.pc = address.wrapping_add(1);
            }
            Op::Rti => {
                self.stack_dummy_read(bus);
                let value = self.pop(bus);
                self.regs.p = Status::from_byte(value);
                self.regs.pc = self.pop_word(bus);
            }
            Op::Brk => self.brk(bus),

            // Flags
            Op::Clc => self.regs.p.clear(C),
            Op::Cld => self.regs.p.clear(D),
            Op::Cli => self.regs.p.clear(I),
            Op::Clv => self.regs.p.clear(V),
            Op::Sec => self.regs.p.set(C),
            Op::Sed => self.regs.p.set(D),
            Op::Sei => self.regs.p.set(I),

            Op::Nop => {
                self.operand_value(bus);
            }

            // Undocumented read-modify-write combinations
            Op::Slo => self.modify(bus, |cpu, value| {
                let shifted = cpu.apply(C, alu::asl(value));
                cpu.set_a(cpu.regs.a | shifted);
                shifted
            }),
            Op::Rla => self.modify(bus, |cpu, value| {
                let carry = cpu.regs.p.is_set(C);
                let rotated = cpu.apply(C, alu::rol(value, carry));
                cpu.set_a(cpu.regs.a & rotated);
                rotated
            }),
            Op::Sre => self.modify(bus, |cpu, value| {
                let shifted = cpu.apply(C, alu::lsr(value));
                cpu.set_a(cpu.regs.a ^ shifted);
                shifted
            }),
            Op::Rra => self.modify(bus, |cpu, value| {
                let carry = cpu.regs.p.is_set(C);
                let rotated = cpu.apply(C, alu::ror(value, carry));
                cpu.adc(rotated);
                rotated
            }),
            Op::Dcp => self.modify(bus, |cpu, value| {
                let value = value.wrapping_sub(1);
                cpu.regs.p.assign(N | Z | C, alu::compare(cpu.regs.a, value));
                value
            }),
            Op::Isb => self.modify(bus, |cpu, value| {
                let value = value.wrapping_add(1);
                cpu.sbc(value);
                value
            }),

            // Undocumented loads, stores and immediates
            Op::Sax => self.store(bus, self.regs.a & self.regs.x),
            Op::Lax => {
                let value = self.operand_value(bus);
                self.set_a(value);
                self.regs.x = value;
            }
            Op::Anc => {
                let value = self.operand_value(bus);
                self.set_a(self.regs.a & value);
                self.regs.p.set_if(C, self.regs.p.is_set(N));
            }
            Op::Alr => {
                let value = self.regs.a & self.operand_value(bus);
                self.regs.p.assign(C, value);
                self.set_a(value >> 1);
            }
            Op::Arr => {
                let value = self.operand_value(bus);
                let carry_in = u8::from(self.regs.p.is_set(C)) << 7;
                self.set_a(((self.regs.a & value) >> 1) | carry_in);
                let a = self.regs.a;
                // C from bit 6, V from bit 6 xor bit 5.
                self.regs.p.assign(C | V, ((a >> 6) & C) | ((a ^ (a << 1)) & V));
            }
            Op::Ane => {
                let value = self.operand_value(bus);
                self.set_a((self.regs.a | 0xEE) & self.regs.x & value);
            }
            Op::Lxa => {
                let value = self.operand_value(bus);
                self.set_a(value);
                self.regs.x = value;
            }
            Op::Sbx => {
                let value = self.operand_value(bus);
                let masked = self.regs.a & self.regs.x;
                self.regs.p.set_if(C, masked >= value);
                self.set_x(masked.wrapping_sub(value));
            }
            Op::Las => {
                let value = self.operand_value(bus) & self.regs.s;
                self.set_a(value);
                self.regs.x = value;
                self.regs.s = value;
            }

            // Stores that AND the value with the target's high byte
            Op::Shy => {
                let base = self.fetch_word(bus);
                self.store_and_high(bus, base, self.regs.x, self.regs.y);
            }
            Op::Shx => {
                let base = self.fetch_word(bus);
                self.store_and_high(bus, base, self.regs.y, self.regs.x);
            }
            Op::ShaA => {
                let base = self.fetch_word(bus);
                self.store_and_high(bus, base, self.regs.y, self.regs.a & self.regs.x);
            }
            Op::ShaZ => {
                let pointer = self.fetch_byte(bus);
                let base = self.read_zero_page_word(bus, pointer);
                self.store_and_high(bus, base, self.regs.y, self.regs.a & self.regs.x);
            }
            Op::Tas => {
                let base = self.fetch_word(bus);
                self.store_and_high(bus, base, self.regs.y, self.regs.a & self.regs.x);
                self.regs.s = self.regs.a & self.regs.x;
            }

            Op::Jam => {
                self.jammed = true;
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                log::warn!("CPU jammed at ${:04X}", self.regs.pc);
            }
        }
    }

    fn set_a(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.update_nz(value);
    }

    fn set_x(&mut self, value: u8) {
        self.regs.x = value;
        self.regs.p.update_nz(value);
    }

    fn set_y(&mut self, value: u8) {
        self.regs.y = value;
        self.regs.p.update_nz(value);
    }

    fn store<B: DmaBus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        self.write(bus, self.operand, value, AccessKind::Write);
    }

    fn adc(&mut self, value: u8) {
        let carry = self.regs.p.is_set(C);
        let result = if self.decimal_active() {
            alu::adc_decimal_nmos(self.regs.a, value, carry)
        } else {
            alu::add(self.regs.a, value, carry)
        };
        self.regs.p.assign(N | V | Z | C, result.flags);
        self.regs.a = result.value;
    }

    fn sbc(&mut self, value: u8) {
        let carry = self.regs.p.is_set(C);
        let result = if self.decimal_active() {
            alu::sbc_decimal_nmos(self.regs.a, value, carry)
        } else {
            alu::sub(self.regs.a, value, carry)
        };
        self.regs.p.assign(N | V | Z | C, result.flags);
        self.regs.a = result.value;
    }

    /// The Ricoh parts store D but have the decimal adder disconnected.
    fn decimal_active(&self) -> bool {
        self.regs.p.is_set(D) && self.variant.has_decimal_mode()
    }

    fn compare<B: DmaBus + ?Sized>(&mut self, bus: &mut B, register: u8) {
        let value = self.operand_value(bus);
        self.regs.p.assign(N | Z | C, alu::compare(register, value));
    }

    fn accumulator(&mut self, f: impl FnOnce(bool, u8) -> AluResult) {
        let result = f(self.regs.p.is_set(C), self.regs.a);
        self.regs.a = self.apply(N | Z | C, result);
    }

    /// Merge the flags selected by `mask` into P and return the value.
    fn apply(&mut self, mask: u8, result: AluResult) -> u8 {
        self.regs.p.assign(mask, result.flags);
        result.value
    }

    /// Read-modify-write: read, write the old value back, write the new one.
    fn modify<B: DmaBus + ?Sized>(&mut self, bus: &mut B, f: impl FnOnce(&mut Self, u8) -> u8) {
        let address = self.operand;
        let value = self.read(bus, address, AccessKind::Read);
        self.write(bus, address, value, AccessKind::DummyWrite);
        let result = f(self, value);
        self.write(bus, address, result, AccessKind::Write);
    }

    fn branch<B: DmaBus + ?Sized>(&mut self, bus: &mut B, taken: bool) {
        if !taken {
            return;
        }
        self.edge.defer_new_irq();
        self.dummy_read(bus);

        let offset = self.operand as u8 as i8;
        let target = self.regs.pc.wrapping_add_signed(i16::from(offset));
        if (target ^ self.regs.pc) & 0xFF00 != 0 {
            self.read(
                bus,
                (self.regs.pc & 0xFF00) | (target & 0x00FF),
                AccessKind::DummyRead,
            );
        }
        self.regs.pc = target;
    }

    fn stack_dummy_read<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        self.read(bus, self.regs.stack_addr(), AccessKind::DummyRead);
    }

    fn jsr<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        let lo = self.fetch_byte(bus);
        self.stack_dummy_read(bus);
        self.push_word(bus, self.regs.pc);
        let hi = self.fetch_byte(bus);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
    }

    fn brk<B: DmaBus + ?Sized>(&mut self, bus: &mut B) {
        self.push_word(bus, self.regs.pc.wrapping_add(1));
        let vector = if self.edge.take_nmi() {
            NMI_VECTOR
        } else {
            IRQ_VECTOR
        };
        self.push(bus, self.regs.p.to_byte_brk());
        self.regs.p.set(I);
        self.regs.pc = self.read_word(bus, vector, AccessKind::Read);
        // I is set and the vector is chosen: an NMI seen during BRK runs
        // after the first handler instruction, not straight away.
        self.edge.clear_prev_nmi();
    }

    /// SHA/SHX/SHY/TAS store path.
    ///
    /// The stored value is ANDed with the base high byte plus one, and a
    /// page crossing replaces the target's high byte with that value. When
    /// a DMA steals the bus during the dummy read the AND is skipped.
    fn store_and_high<B: DmaBus + ?Sized>(
        &mut self,
        bus: &mut B,
        base: u16,
        index: u8,
        value: u8,
    ) {
        let address = base.wrapping_add(u16::from(index));
        let page_crossed = (base ^ address) & 0xFF00 != 0;

        let before = self.regs.cycles;
        self.read(
            bus,
            (base & 0xFF00) | (address & 0x00FF),
            AccessKind::DummyRead,
        );
        let had_dma = self.regs.cycles - before > 1;

        let [lo, mut hi] = address.to_le_bytes();
        if page_crossed {
            hi &= value;
        }
        let stored = if had_dma {
            value
        } else {
            value & ((base >> 8) as u8).wrapping_add(1)
        };
        self.write(bus, u16::from_le_bytes([lo, hi]), stored, AccessKind::Write);
    }
}
