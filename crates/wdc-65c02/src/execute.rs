//! Instruction handlers.
//!
//! Operand resolution has already run; handlers read through
//! `operand_value` or work on `self.operand` as an address. Idle cycles
//! read at PC.

use emu_core::{AccessKind, Bus};
use mos_6502::Status;
use mos_6502::alu::{self, AluResult};
use mos_6502::flags::{C, D, I, N, V, Z};

use crate::Wdc65c02;
use crate::cpu::StopState;
use crate::opcodes::Op;

impl Wdc65c02 {
    pub(crate) fn execute<B: Bus + ?Sized>(&mut self, bus: &mut B, op: Op) {
        match op {
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
            Op::Stz => self.store(bus, 0),

            Op::Tax => self.set_x(self.regs.a),
            Op::Tay => self.set_y(self.regs.a),
            Op::Tsx => self.set_x(self.regs.s),
            Op::Txa => self.set_a(self.regs.x),
            Op::Txs => self.regs.s = self.regs.x,
            Op::Tya => self.set_a(self.regs.y),

            Op::Pha => self.push(bus, self.regs.a),
            Op::Phx => self.push(bus, self.regs.x),
            Op::Phy => self.push(bus, self.regs.y),
            Op::Php => self.push(bus, self.regs.p.to_byte_brk()),
            Op::Pla => {
                let value = self.pull(bus);
                self.set_a(value);
            }
            Op::Plx => {
                let value = self.pull(bus);
                self.set_x(value);
            }
            Op::Ply => {
                let value = self.pull(bus);
                self.set_y(value);
            }
            Op::Plp => {
                let value = self.pull(bus);
                self.regs.p = Status::from_byte(value);
            }

            Op::Adc => {
                let value = self.operand_value(bus);
                self.adc(bus, value);
            }
            Op::Sbc => {
                let value = self.operand_value(bus);
                self.sbc(bus, value);
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
            Op::BitImm => {
                let value = self.operand_value(bus);
                self.regs.p.set_if(Z, self.regs.a & value == 0);
            }
            Op::Cmp => self.compare(bus, self.regs.a),
            Op::Cpx => self.compare(bus, self.regs.x),
            Op::Cpy => self.compare(bus, self.regs.y),

            Op::Inc => self.modify(bus, |cpu, value| cpu.apply(N | Z, alu::inc(value))),
            Op::Dec => self.modify(bus, |cpu, value| cpu.apply(N | Z, alu::dec(value))),
            Op::IncAcc => self.set_a(self.regs.a.wrapping_add(1)),
            Op::DecAcc => self.set_a(self.regs.a.wrapping_sub(1)),
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
            Op::Tsb => self.modify(bus, |cpu, value| {
                cpu.regs.p.set_if(Z, cpu.regs.a & value == 0);
                value | cpu.regs.a
            }),
            Op::Trb => self.modify(bus, |cpu, value| {
                cpu.regs.p.set_if(Z, cpu.regs.a & value == 0);
                value & !cpu.regs.a
            }),

            Op::Bcc => self.branch(bus, !self.regs.p.is_set(C)),
            Op::Bcs => self.branch(bus, self.regs.p.is_set(C)),
            Op::Beq => self.branch(bus, self.regs.p.is_set(Z)),
            Op::Bmi => self.branch(bus, self.regs.p.is_set(N)),
            Op::Bne => self.branch(bus, !self.regs.p.is_set(Z)),
            Op::Bpl => self.branch(bus, !self.regs.p.is_set(N)),
            Op::Bvc => self.branch(bus, !self.regs.p.is_set(V)),
            Op::Bvs => self.branch(bus, self.regs.p.is_set(V)),
            Op::Bra => self.branch(bus, true),

            Op::Jmp => self.regs.pc = self.operand,
            Op::Jsr => {
                self.dummy_read(bus);
                self.push_word(bus, self.regs.pc.wrapping_sub(1));
                self.regs.pc = self.operand;
            }
            Op::Rts => {
                self.dummy_read(bus);
                let address = self.pop_word(bus);
                self.dummy_read(bus);
                self.regs.pc = address.wrapping_add(1);
            }
            Op::Rti => {
                self.dummy_read(bus);
                let value = self.pop(bus);
                self.regs.p = Status::from_byte(value);
                self.regs.pc = self.pop_word(bus);
            }
            Op::Brk => self.brk(bus),

            Op::Clc => self.regs.p.clear(C),
            Op::Cld => self.regs.p.clear(D),
            Op::Cli => self.regs.p.clear(I),
            Op::Clv => self.regs.p.clear(V),
            Op::Sec => self.regs.p.set(C),
            Op::Sed => self.regs.p.set(D),
            Op::Sei => self.regs.p.set(I),

            // The operand bytes (if any) were consumed by the fetch.
            Op::Nop => {}
            Op::NopAbs => self.dummy_read(bus),
            Op::NopAbsSlow => {
                for _ in 0..5 {
                    self.dummy_read(bus);
                }
            }

            Op::Wai => self.stop = StopState::WaitingForIrq,
            Op::Stp => {
                self.stop = StopState::Stopped;
                log::warn!("CPU stopped at ${:04X}", self.regs.pc.wrapping_sub(1));
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

    fn store<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        self.write(bus, self.operand, value);
    }

    /// Stack pull: one idle cycle, then the pop.
    fn pull<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.dummy_read(bus);
        self.pop(bus)
    }

    /// Decimal mode costs one extra cycle and produces valid N and Z.
    fn adc<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        let carry = self.regs.p.is_set(C);
        let result = if self.regs.p.is_set(D) {
            self.dummy_read(bus);
            alu::adc_decimal_cmos(self.regs.a, value, carry)
        } else {
            alu::add(self.regs.a, value, carry)
        };
        self.regs.a = self.apply(N | V | Z | C, result);
    }

    fn sbc<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        let carry = self.regs.p.is_set(C);
        let result = if self.regs.p.is_set(D) {
            self.dummy_read(bus);
            alu::sbc_decimal_cmos(self.regs.a, value, carry)
        } else {
            alu::sub(self.regs.a, value, carry)
        };
        self.regs.a = self.apply(N | V | Z | C, result);
    }

    fn compare<B: Bus + ?Sized>(&mut self, bus: &mut B, register: u8) {
        let value = self.operand_value(bus);
        self.regs.p.assign(N | Z | C, alu::compare(register, value));
    }

    fn accumulator(&mut self, f: impl FnOnce(bool, u8) -> AluResult) {
        let result = f(self.regs.p.is_set(C), self.regs.a);
        self.regs.a = self.apply(N | Z | C, result);
    }

    fn apply(&mut self, mask: u8, result: AluResult) -> u8 {
        self.regs.p.assign(mask, result.flags);
        result.value
    }

    /// Read-modify-write: read, idle, write. The CMOS part never writes the
    /// unmodified value back.
    fn modify<B: Bus + ?Sized>(&mut self, bus: &mut B, f: impl FnOnce(&mut Self, u8) -> u8) {
        let address = self.operand;
        let value = self.read(bus, address, AccessKind::Read);
        self.dummy_read(bus);
        let result = f(self, value);
        self.write(bus, address, result);
    }

    fn branch<B: Bus + ?Sized>(&mut self, bus: &mut B, taken: bool) {
        if !taken {
            return;
        }
        self.dummy_read(bus);

        let offset = self.operand as u8 as i8;
        let target = self.regs.pc.wrapping_add_signed(i16::from(offset));
        if (target ^ self.regs.pc) & 0xFF00 != 0 {
            self.dummy_read(bus);
        }
        self.regs.pc = target;
    }

    /// BRK skips a padding byte, clears D and always goes through the IRQ
    /// vector.
    fn brk<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.fetch_byte(bus);
        self.push_word(bus, self.regs.pc);
        self.push(bus, self.regs.p.to_byte_brk());
        self.regs.p.set(I);
        self.regs.p.clear(D);
        self.regs.pc = self.read_word(bus, mos_6502::IRQ_VECTOR);
    }
}
