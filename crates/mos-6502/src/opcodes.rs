//! Opcode table for the NMOS 6502.
//!
//! All 256 opcodes, documented or not, map to an addressing mode and an
//! operation. Undocumented opcodes are deterministic on NMOS silicon and
//! shipped software relies on several of them, so none of them fall back
//! to a generic "illegal" handler.

/// Addressing mode of an opcode.
///
/// The resolver issues every bus cycle the mode implies before the
/// operation runs. `Other` means the operation fetches its own operands
/// (JSR and the SHx/TAS family, whose cycles interleave with the address
/// calculation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// No operand fetch at all (JAM).
    None,
    /// Accumulator, e.g. `ASL A`.
    Acc,
    /// Implied.
    Imp,
    /// `#nn`
    Imm,
    /// Branch offset.
    Rel,
    /// `$nn`
    Zero,
    /// `$nnnn`
    Abs,
    /// `$nn,X`
    ZeroX,
    /// `$nn,Y`
    ZeroY,
    /// `($nnnn)`, JMP only.
    Ind,
    /// `($nn,X)`
    IndX,
    /// `($nn),Y`
    IndY,
    /// `($nn),Y` with the fix-up cycle always taken (stores, RMW).
    IndYW,
    /// `$nnnn,X`
    AbsX,
    /// `$nnnn,X` with the fix-up cycle always taken.
    AbsXW,
    /// `$nnnn,Y`
    AbsY,
    /// `$nnnn,Y` with the fix-up cycle always taken.
    AbsYW,
    /// Operands fetched by the operation itself.
    Other,
}

impl AddrMode {
    /// True if the resolved operand is an address rather than a value.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        !matches!(
            self,
            Self::None | Self::Acc | Self::Imp | Self::Imm | Self::Rel
        )
    }

    /// Operand bytes following the opcode. `Other` reports 0; see
    /// [`OpcodeEntry::len`] for the real length of those opcodes.
    #[must_use]
    pub const fn operand_len(self) -> u8 {
        match self {
            Self::None | Self::Acc | Self::Imp | Self::Other => 0,
            Self::Imm
            | Self::Rel
            | Self::Zero
            | Self::ZeroX
            | Self::ZeroY
            | Self::IndX
            | Self::IndY
            | Self::IndYW => 1,
            Self::Abs | Self::Ind | Self::AbsX | Self::AbsXW | Self::AbsY | Self::AbsYW => 2,
        }
    }
}

/// Operation executed after the addressing mode has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    // Loads, stores, transfers
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Stack
    Pha,
    Php,
    Pla,
    Plp,
    // Arithmetic and logic
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Bit,
    Cmp,
    Cpx,
    Cpy,
    // Increments, decrements, shifts
    Inc,
    Dec,
    Inx,
    Iny,
    Dex,
    Dey,
    AslAcc,
    AslMem,
    LsrAcc,
    LsrMem,
    RolAcc,
    RolMem,
    RorAcc,
    RorMem,
    // Control flow
    Bcc,
    Bcs,
    Beq,
    Bmi,
    Bne,
    Bpl,
    Bvc,
    Bvs,
    Jmp,
    Jsr,
    Rts,
    Rti,
    Brk,
    // Flags
    Clc,
    Cld,
    Cli,
    Clv,
    Sec,
    Sed,
    Sei,
    Nop,
    // Undocumented
    Slo,
    Rla,
    Sre,
    Rra,
    Sax,
    Lax,
    Dcp,
    Isb,
    Anc,
    Alr,
    Arr,
    Ane,
    Lxa,
    Sbx,
    Las,
    ShaZ,
    ShaA,
    Shx,
    Shy,
    Tas,
    Jam,
}

/// One row of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub op: Op,
    pub mode: AddrMode,
}

impl OpcodeEntry {
    const fn new(op: Op, mode: AddrMode) -> Self {
        Self { op, mode }
    }

    /// Instruction length in bytes, opcode included.
    #[must_use]
    pub const fn len(self) -> u8 {
        match self.op {
            Op::Jsr | Op::ShaA | Op::Shx | Op::Shy | Op::Tas => 3,
            Op::ShaZ | Op::Brk => 2,
            _ => 1 + self.mode.operand_len(),
        }
    }
}

/// Look up an opcode.
#[must_use]
pub fn decode(opcode: u8) -> OpcodeEntry {
    OPCODES[opcode as usize]
}

use AddrMode::{
    Abs, AbsX, AbsXW, AbsY, AbsYW, Acc, Imm, Imp, Ind, IndX, IndY, IndYW, Other, Rel, Zero, ZeroX,
    ZeroY,
};
use Op::{
    Adc, Alr, Anc, And, Ane, Arr, AslAcc, AslMem, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc,
    Bvs, Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dcp, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Isb, Jam,
    Jmp, Jsr, Las, Lax, Lda, Ldx, Ldy, LsrAcc, LsrMem, Lxa, Nop, Ora, Pha, Php, Pla, Plp, Rla,
    RolAcc, RolMem, RorAcc, RorMem, Rra, Rti, Rts, Sax, Sbc, Sbx, Sec, Sed, Sei, ShaA, ShaZ,
    Shx, Shy, Slo, Sre, Sta, Stx, Sty, Tas, Tax, Tay, Tsx, Txa, Txs, Tya,
};

const fn e(op: Op, mode: AddrMode) -> OpcodeEntry {
    OpcodeEntry::new(op, mode)
}

const JAM: OpcodeEntry = e(Jam, AddrMode::None);

#[rustfmt::skip]
pub static OPCODES: [OpcodeEntry; 256] = [
    // $00
    e(Brk, Imp),    e(Ora, IndX),   JAM,            e(Slo, IndX),   e(Nop, Zero),   e(Ora, Zero),   e(AslMem, Zero),  e(Slo, Zero),
    e(Php, Imp),    e(Ora, Imm),    e(AslAcc, Acc), e(Anc, Imm),    e(Nop, Abs),    e(Ora, Abs),    e(AslMem, Abs),   e(Slo, Abs),
    // $10
    e(Bpl, Rel),    e(Ora, IndY),   JAM,            e(Slo, IndYW),  e(Nop, ZeroX),  e(Ora, ZeroX),  e(AslMem, ZeroX), e(Slo, ZeroX),
    e(Clc, Imp),    e(Ora, AbsY),   e(Nop, Imp),    e(Slo, AbsYW),  e(Nop, AbsX),   e(Ora, AbsX),   e(AslMem, AbsXW), e(Slo, AbsXW),
    // $20
    e(Jsr, Other),  e(And, IndX),   JAM,            e(Rla, IndX),   e(Bit, Zero),   e(And, Zero),   e(RolMem, Zero),  e(Rla, Zero),
    e(Plp, Imp),    e(And, Imm),    e(RolAcc, Acc), e(Anc, Imm),    e(Bit, Abs),    e(And, Abs),    e(RolMem, Abs),   e(Rla, Abs),
    // $30
    e(Bmi, Rel),    e(And, IndY),   JAM,            e(Rla, IndYW),  e(Nop, ZeroX),  e(And, ZeroX),  e(RolMem, ZeroX), e(Rla, ZeroX),
    e(Sec, Imp),    e(And, AbsY),   e(Nop, Imp),    e(Rla, AbsYW),  e(Nop, AbsX),   e(And, AbsX),   e(RolMem, AbsXW), e(Rla, AbsXW),
    // $40
    e(Rti, Imp),    e(Eor, IndX),   JAM,            e(Sre, IndX),   e(Nop, Zero),   e(Eor, Zero),   e(LsrMem, Zero),  e(Sre, Zero),
    e(Pha, Imp),    e(Eor, Imm),    e(LsrAcc, Acc), e(Alr, Imm),    e(Jmp, Abs),    e(Eor, Abs),    e(LsrMem, Abs),   e(Sre, Abs),
    // $50
    e(Bvc, Rel),    e(Eor, IndY),   JAM,            e(Sre, IndYW),  e(Nop, ZeroX),  e(Eor, ZeroX),  e(LsrMem, ZeroX), e(Sre, ZeroX),
    e(Cli, Imp),    e(Eor, AbsY),   e(Nop, Imp),    e(Sre, AbsYW),  e(Nop, AbsX),   e(Eor, AbsX),   e(LsrMem, AbsXW), e(Sre, AbsXW),
    // $60
    e(Rts, Imp),    e(Adc, IndX),   JAM,            e(Rra, IndX),   e(Nop, Zero),   e(Adc, Zero),   e(RorMem, Zero),  e(Rra, Zero),
    e(Pla, Imp),    e(Adc, Imm),    e(RorAcc, Acc), e(Arr, Imm),    e(Jmp, Ind),    e(Adc, Abs),    e(RorMem, Abs),   e(Rra, Abs),
    // $70
    e(Bvs, Rel),    e(Adc, IndY),   JAM,            e(Rra, IndYW),  e(Nop, ZeroX),  e(Adc, ZeroX),  e(RorMem, ZeroX), e(Rra, ZeroX),
    e(Sei, Imp),    e(Adc, AbsY),   e(Nop, Imp),    e(Rra, AbsYW),  e(Nop, AbsX),   e(Adc, AbsX),   e(RorMem, AbsXW), e(Rra, AbsXW),
    // $80
    e(Nop, Imm),    e(Sta, IndX),   e(Nop, Imm),    e(Sax, IndX),   e(Sty, Zero),   e(Sta, Zero),   e(Stx, Zero),     e(Sax, Zero),
    e(Dey, Imp),    e(Nop, Imm),    e(Txa, Imp),    e(Ane, Imm),    e(Sty, Abs),    e(Sta, Abs),    e(Stx, Abs),      e(Sax, Abs),
    // $90
    e(Bcc, Rel),    e(Sta, IndYW),  JAM,            e(ShaZ, Other), e(Sty, ZeroX),  e(Sta, ZeroX),  e(Stx, ZeroY),    e(Sax, ZeroY),
    e(Tya, Imp),    e(Sta, AbsYW),  e(Txs, Imp),    e(Tas, Other),  e(Shy, Other),  e(Sta, AbsXW),  e(Shx, Other),    e(ShaA, Other),
    // $A0
    e(Ldy, Imm),    e(Lda, IndX),   e(Ldx, Imm),    e(Lax, IndX),   e(Ldy, Zero),   e(Lda, Zero),   e(Ldx, Zero),     e(Lax, Zero),
    e(Tay, Imp),    e(Lda, Imm),    e(Tax, Imp),    e(Lxa, Imm),    e(Ldy, Abs),    e(Lda, Abs),    e(Ldx, Abs),      e(Lax, Abs),
    // $B0
    e(Bcs, Rel),    e(Lda, IndY),   JAM,            e(Lax, IndY),   e(Ldy, ZeroX),  e(Lda, ZeroX),  e(Ldx, ZeroY),    e(Lax, ZeroY),
    e(Clv, Imp),    e(Lda, AbsY),   e(Tsx, Imp),    e(Las, AbsY),   e(Ldy, AbsX),   e(Lda, AbsX),   e(Ldx, AbsY),     e(Lax, AbsY),
    // $C0
    e(Cpy, Imm),    e(Cmp, IndX),   e(Nop, Imm),    e(Dcp, IndX),   e(Cpy, Zero),   e(Cmp, Zero),   e(Dec, Zero),     e(Dcp, Zero),
    e(Iny, Imp),    e(Cmp, Imm),    e(Dex, Imp),    e(Sbx, Imm),    e(Cpy, Abs),    e(Cmp, Abs),    e(Dec, Abs),      e(Dcp, Abs),
    // $D0
    e(Bne, Rel),    e(Cmp, IndY),   JAM,            e(Dcp, IndYW),  e(Nop, ZeroX),  e(Cmp, ZeroX),  e(Dec, ZeroX),    e(Dcp, ZeroX),
    e(Cld, Imp),    e(Cmp, AbsY),   e(Nop, Imp),    e(Dcp, AbsYW),  e(Nop, AbsX),   e(Cmp, AbsX),   e(Dec, AbsXW),    e(Dcp, AbsXW),
    // $E0
    e(Cpx, Imm),    e(Sbc, IndX),   e(Nop, Imm),    e(Isb, IndX),   e(Cpx, Zero),   e(Sbc, Zero),   e(Inc, Zero),     e(Isb, Zero),
    e(Inx, Imp),    e(Sbc, Imm),    e(Nop, Imp),    e(Sbc, Imm),    e(Cpx, Abs),    e(Sbc, Abs),    e(Inc, Abs),      e(Isb, Abs),
    // $F0
    e(Beq, Rel),    e(Sbc, IndY),   JAM,            e(Isb, IndYW),  e(Nop, ZeroX),  e(Sbc, ZeroX),  e(Inc, ZeroX),    e(Isb, ZeroX),
    e(Sed, Imp),    e(Sbc, AbsY),   e(Nop, Imp),    e(Isb, AbsYW),  e(Nop, AbsX),   e(Sbc, AbsX),   e(Inc, AbsXW),    e(Isb, AbsXW),
];
