//! Opcode table for the 65C02.
//!
//! The CMOS part has no undocumented operations: every opcode not listed
//! below is a one-byte, two-cycle NOP, apart from a handful of multi-byte
//! NOPs that still consume operand bytes.

/// Addressing mode of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// No operand fetch (BRK reads its own padding byte).
    None,
    Acc,
    Imp,
    Imm,
    Rel,
    Zero,
    ZeroX,
    ZeroY,
    Abs,
    AbsX,
    /// `$nnnn,X` with the fix-up cycle always taken.
    AbsXW,
    AbsY,
    /// `$nnnn,Y` with the fix-up cycle always taken.
    AbsYW,
    /// `($nnnn)`, JMP only. No page-wrap bug on CMOS.
    Ind,
    IndX,
    IndY,
    /// `($nn),Y` with the fix-up cycle always taken.
    IndYW,
    /// `($nn)`
    ZeroInd,
    /// `($nnnn,X)`, JMP only.
    AbsIndX,
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

    #[must_use]
    pub const fn operand_len(self) -> u8 {
        match self {
            Self::None | Self::Acc | Self::Imp => 0,
            Self::Imm
            | Self::Rel
            | Self::Zero
            | Self::ZeroX
            | Self::ZeroY
            | Self::IndX
            | Self::IndY
            | Self::IndYW
            | Self::ZeroInd => 1,
            Self::Abs
            | Self::AbsX
            | Self::AbsXW
            | Self::AbsY
            | Self::AbsYW
            | Self::Ind
            | Self::AbsIndX => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Stz,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    Pha,
    Php,
    Pla,
    Plp,
    Phx,
    Plx,
    Phy,
    Ply,
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Bit,
    /// `BIT #imm` only touches Z.
    BitImm,
    Cmp,
    Cpx,
    Cpy,
    Inc,
    Dec,
    IncAcc,
    DecAcc,
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
    Tsb,
    Trb,
    Bcc,
    Bcs,
    Beq,
    Bmi,
    Bne,
    Bpl,
    Bvc,
    Bvs,
    Bra,
    Jmp,
    Jsr,
    Rts,
    Rti,
    Brk,
    Clc,
    Cld,
    Cli,
    Clv,
    Sec,
    Sed,
    Sei,
    Nop,
    /// `$DC`/`$FC`: absolute operand, one idle cycle.
    NopAbs,
    /// `$5C`: absolute operand, five idle cycles.
    NopAbsSlow,
    Wai,
    Stp,
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
            Op::Brk => 2,
            _ => 1 + self.mode.operand_len(),
        }
    }
}

#[must_use]
pub fn decode(opcode: u8) -> OpcodeEntry {
    OPCODES[opcode as usize]
}

use AddrMode::{
    Abs, AbsIndX, AbsX, AbsXW, AbsY, AbsYW, Acc, Imm, Imp, Ind, IndX, IndY, IndYW, Rel, Zero,
    ZeroInd, ZeroX, ZeroY,
};
use Op::{
    Adc, And, AslAcc, AslMem, Bcc, Bcs, Beq, Bit, BitImm, Bmi, Bne, Bpl, Bra, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, DecAcc, Dex, Dey, Eor, Inc, IncAcc, Inx, Iny, Jmp, Jsr, Lda,
    Ldx, Ldy, LsrAcc, LsrMem, Nop, NopAbs, NopAbsSlow, Ora, Pha, Php, Phx, Phy, Pla, Plp, Plx, Ply,
    RolAcc, RolMem, RorAcc, RorMem, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stp, Stx, Sty, Stz, Tax, Tay,
    Trb, Tsb, Tsx, Txa, Txs, Tya, Wai,
};

/// Opcodes that differ from the default one-byte NOP.
#[rustfmt::skip]
const DEFINED: &[(u8, Op, AddrMode)] = &[
    (0x00, Brk, AddrMode::None),

    // ORA AND EOR ADC SBC CMP, eight modes each
    (0x01, Ora, IndX), (0x05, Ora, Zero), (0x09, Ora, Imm), (0x0D, Ora, Abs),
    (0x11, Ora, IndY), (0x12, Ora, ZeroInd), (0x15, Ora, ZeroX), (0x19, Ora, AbsY), (0x1D, Ora, AbsX),
    (0x21, And, IndX), (0x25, And, Zero), (0x29, And, Imm), (0x2D, And, Abs),
    (0x31, And, IndY), (0x32, And, ZeroInd), (0x35, And, ZeroX), (0x39, And, AbsY), (0x3D, And, AbsX),
    (0x41, Eor, IndX), (0x45, Eor, Zero), (0x49, Eor, Imm), (0x4D, Eor, Abs),
    (0x51, Eor, IndY), (0x52, Eor, ZeroInd), (0x55, Eor, ZeroX), (0x59, Eor, AbsY), (0x5D, Eor, AbsX),
    (0x61, Adc, IndX), (0x65, Adc, Zero), (0x69, Adc, Imm), (0x6D, Adc, Abs),
    (0x71, Adc, IndY), (0x72, Adc, ZeroInd), (0x75, Adc, ZeroX), (0x79, Adc, AbsY), (0x7D, Adc, AbsX),
    (0xE1, Sbc, IndX), (0xE5, Sbc, Zero), (0xE9, Sbc, Imm), (0xED, Sbc, Abs),
    (0xF1, Sbc, IndY), (0xF2, Sbc, ZeroInd), (0xF5, Sbc, ZeroX), (0xF9, Sbc, AbsY), (0xFD, Sbc, AbsX),
    (0xC1, Cmp, IndX), (0xC5, Cmp, Zero), (0xC9, Cmp, Imm), (0xCD, Cmp, Abs),
    (0xD1, Cmp, IndY), (0xD2, Cmp, ZeroInd), (0xD5, Cmp, ZeroX), (0xD9, Cmp, AbsY), (0xDD, Cmp, AbsX),

    (0xE0, Cpx, Imm), (0xE4, Cpx, Zero), (0xEC, Cpx, Abs),
    (0xC0, Cpy, Imm), (0xC4, Cpy, Zero), (0xCC, Cpy, Abs),

    // Loads
    (0xA1, Lda, IndX), (0xA5, Lda, Zero), (0xA9, Lda, Imm), (0xAD, Lda, Abs),
    (0xB1, Lda, IndY), (0xB2, Lda, ZeroInd), (0xB5, Lda, ZeroX), (0xB9, Lda, AbsY), (0xBD, Lda, AbsX),
    (0xA2, Ldx, Imm), (0xA6, Ldx, Zero), (0xAE, Ldx, Abs), (0xB6, Ldx, ZeroY), (0xBE, Ldx, AbsY),
    (0xA0, Ldy, Imm), (0xA4, Ldy, Zero), (0xAC, Ldy, Abs), (0xB4, Ldy, ZeroX), (0xBC, Ldy, AbsX),

    // Stores
    (0x81, Sta, IndX), (0x85, Sta, Zero), (0x8D, Sta, Abs), (0x91, Sta, IndYW),
    (0x92, Sta, ZeroInd), (0x95, Sta, ZeroX), (0x99, Sta, AbsYW), (0x9D, Sta, AbsXW),
    (0x86, Stx, Zero), (0x8E, Stx, Abs), (0x96, Stx, ZeroY),
    (0x84, Sty, Zero), (0x8C, Sty, Abs), (0x94, Sty, ZeroX),
    (0x64, Stz, Zero), (0x74, Stz, ZeroX), (0x9C, Stz, Abs), (0x9E, Stz, AbsXW),

    // Transfers and stack
    (0xAA, Tax, Imp), (0xA8, Tay, Imp), (0x8A, Txa, Imp), (0x98, Tya, Imp),
    (0xBA, Tsx, Imp), (0x9A, Txs, Imp),
    (0x48, Pha, Imp), (0x68, Pla, Imp), (0x08, Php, Imp), (0x28, Plp, Imp),
    (0xDA, Phx, Imp), (0xFA, Plx, Imp), (0x5A, Phy, Imp), (0x7A, Ply, Imp),

    // Increments and decrements
    (0xE6, Inc, Zero), (0xEE, Inc, Abs), (0xF6, Inc, ZeroX), (0xFE, Inc, AbsXW), (0x1A, IncAcc, Acc),
    (0xC6, Dec, Zero), (0xCE, Dec, Abs), (0xD6, Dec, ZeroX), (0xDE, Dec, AbsXW), (0x3A, DecAcc, Acc),
    (0xE8, Inx, Imp), (0xC8, Iny, Imp), (0xCA, Dex, Imp), (0x88, Dey, Imp),

    // Shifts and rotates
    (0x0A, AslAcc, Acc), (0x06, AslMem, Zero), (0x0E, AslMem, Abs), (0x16, AslMem, ZeroX), (0x1E, AslMem, AbsXW),
    (0x4A, LsrAcc, Acc), (0x46, LsrMem, Zero), (0x4E, LsrMem, Abs), (0x56, LsrMem, ZeroX), (0x5E, LsrMem, AbsXW),
    (0x2A, RolAcc, Acc), (0x26, RolMem, Zero), (0x2E, RolMem, Abs), (0x36, RolMem, ZeroX), (0x3E, RolMem, AbsXW),
    (0x6A, RorAcc, Acc), (0x66, RorMem, Zero), (0x6E, RorMem, Abs), (0x76, RorMem, ZeroX), (0x7E, RorMem, AbsXW),

    // Bit tests
    (0x24, Bit, Zero), (0x2C, Bit, Abs), (0x34, Bit, ZeroX), (0x3C, Bit, AbsX), (0x89, BitImm, Imm),
    (0x04, Tsb, Zero), (0x0C, Tsb, Abs), (0x14, Trb, Zero), (0x1C, Trb, Abs),

    // Branches
    (0x90, Bcc, Rel), (0xB0, Bcs, Rel), (0xF0, Beq, Rel), (0xD0, Bne, Rel),
    (0x30, Bmi, Rel), (0x10, Bpl, Rel), (0x70, Bvs, Rel), (0x50, Bvc, Rel), (0x80, Bra, Rel),

    // Jumps
    (0x4C, Jmp, Abs), (0x6C, Jmp, Ind), (0x7C, Jmp, AbsIndX),
    (0x20, Jsr, Abs), (0x60, Rts, Imp), (0x40, Rti, Imp),

    // Flags
    (0x18, Clc, Imp), (0x38, Sec, Imp), (0xD8, Cld, Imp), (0xF8, Sed, Imp),
    (0x58, Cli, Imp), (0x78, Sei, Imp), (0xB8, Clv, Imp),

    (0xCB, Wai, Imp), (0xDB, Stp, Imp),

    // NOPs that consume operand bytes
    (0x02, Nop, Imm), (0x22, Nop, Imm), (0x42, Nop, Imm), (0x62, Nop, Imm),
    (0x82, Nop, Imm), (0xC2, Nop, Imm), (0xE2, Nop, Imm), (0x44, Nop, Imm),
    (0x5C, NopAbsSlow, Abs), (0xDC, NopAbs, Abs), (0xFC, NopAbs, Abs),
];

const fn build_table() -> [OpcodeEntry; 256] {
    let mut table = [OpcodeEntry::new(Nop, Imp); 256];
    let mut i = 0;
    while i < DEFINED.len() {
        let (opcode, op, mode) = DEFINED[i];
        table[opcode as usize] = OpcodeEntry::new(op, mode);
        i += 1;
    }
    table
}

pub static OPCODES: [OpcodeEntry; 256] = build_table();
