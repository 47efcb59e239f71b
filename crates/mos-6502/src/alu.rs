//! Arithmetic and logic unit.
//!
//! Pure functions from operands (and carry) to a result plus flag bits.
//! Callers merge the flags into P with [`Status::assign`](crate::Status::assign)
//! using the mask of flags the instruction affects, so nothing here needs to
//! know about the rest of the status register.
//!
//! N is bit 7 of the result and V is derived from bit 7 of the operands,
//! so most flags fall out of bit operations without a branch.

use crate::flags::{C, N, V, Z};

/// Result byte together with the flags it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

impl AluResult {
    const fn with_nz(value: u8, flags: u8) -> Self {
        Self {
            value,
            flags: flags | nz(value),
        }
    }
}

/// N and Z for a value.
#[must_use]
pub const fn nz(value: u8) -> u8 {
    (value & N) | (((value == 0) as u8) << 1)
}

/// Binary add with carry. Sets N, V, Z and C.
#[must_use]
pub const fn add(a: u8, b: u8, carry: bool) -> AluResult {
    let sum = a as u16 + b as u16 + carry as u16;
    let result = sum as u8;
    let overflow = (!(a ^ b) & (a ^ result) & 0x80) >> 1;
    AluResult::with_nz(result, overflow | (sum >> 8) as u8)
}

/// Binary subtract with borrow (carry clear = borrow). Sets N, V, Z and C.
#[must_use]
pub const fn sub(a: u8, b: u8, carry: bool) -> AluResult {
    add(a, !b, carry)
}

/// Flags of `register - value`. Sets N, Z and C; the result is dropped.
#[must_use]
pub const fn compare(register: u8, value: u8) -> u8 {
    sub(register, value, true).flags & (N | Z | C)
}

/// BIT: Z from `a & value`, N and V copied from bits 7 and 6 of `value`.
#[must_use]
pub const fn bit(a: u8, value: u8) -> u8 {
    (value & (N | V)) | ((((a & value) == 0) as u8) << 1)
}

#[must_use]
pub const fn asl(value: u8) -> AluResult {
    AluResult::with_nz(value << 1, value >> 7)
}

#[must_use]
pub const fn lsr(value: u8) -> AluResult {
    AluResult::with_nz(value >> 1, value & C)
}

#[must_use]
pub const fn rol(value: u8, carry: bool) -> AluResult {
    AluResult::with_nz((value << 1) | carry as u8, value >> 7)
}

#[must_use]
pub const fn ror(value: u8, carry: bool) -> AluResult {
    AluResult::with_nz((value >> 1) | ((carry as u8) << 7), value & C)
}

#[must_use]
pub const fn inc(value: u8) -> AluResult {
    AluResult::with_nz(value.wrapping_add(1), 0)
}

#[must_use]
pub const fn dec(value: u8) -> AluResult {
    AluResult::with_nz(value.wrapping_sub(1), 0)
}

/// NMOS decimal ADC.
///
/// The accumulator gets the BCD sum. Z comes from the binary sum, N and V
/// from the high nibble before its decimal correction, C from the
/// corrected high nibble.
#[must_use]
pub const fn adc_decimal_nmos(a: u8, b: u8, carry: bool) -> AluResult {
    let mut lo = (a & 0x0F) + (b & 0x0F) + carry as u8;
    if lo > 9 {
        lo += 6;
    }
    let mut hi = (a >> 4) + (b >> 4) + (lo > 0x0F) as u8;

    let binary = a.wrapping_add(b).wrapping_add(carry as u8);
    let intermediate = hi << 4;
    let mut flags = (((binary == 0) as u8) << 1) | (intermediate & N);
    flags |= (!(a ^ b) & (a ^ intermediate) & 0x80) >> 1;

    if hi > 9 {
        hi += 6;
    }
    flags |= (hi > 0x0F) as u8;

    AluResult {
        value: (hi << 4) | (lo & 0x0F),
        flags,
    }
}

/// NMOS decimal SBC. All flags are those of the binary subtraction.
#[must_use]
pub const fn sbc_decimal_nmos(a: u8, b: u8, carry: bool) -> AluResult {
    let borrow = !carry as i16;
    let mut lo = (a & 0x0F) as i16 - (b & 0x0F) as i16 - borrow;
    let mut hi = (a >> 4) as i16 - (b >> 4) as i16;
    if lo < 0 {
        lo -= 6;
        hi -= 1;
    }
    if hi < 0 {
        hi -= 6;
    }

    AluResult {
        value: ((hi << 4) as u8) | ((lo & 0x0F) as u8),
        flags: sub(a, b, carry).flags,
    }
}

/// CMOS decimal ADC. N and Z reflect the BCD result; V is the binary one.
#[must_use]
pub const fn adc_decimal_cmos(a: u8, b: u8, carry: bool) -> AluResult {
    let mut lo = (a & 0x0F) + (b & 0x0F) + carry as u8;
    if lo > 9 {
        lo += 6;
    }
    let mut hi = (a >> 4) + (b >> 4) + (lo > 0x0F) as u8;
    if hi > 9 {
        hi += 6;
    }
    let value = (lo & 0x0F) | ((hi & 0x0F) << 4);
    let overflow = add(a, b, carry).flags & V;
    AluResult::with_nz(value, overflow | (hi > 0x0F) as u8)
}

/// CMOS decimal SBC. N and Z reflect the BCD result; C and V the binary one.
#[must_use]
pub const fn sbc_decimal_cmos(a: u8, b: u8, carry: bool) -> AluResult {
    let borrow = !carry as i16;
    let mut lo = (a & 0x0F) as i16 - (b & 0x0F) as i16 - borrow;
    let lo_borrow = lo < 0;
    if lo_borrow {
        lo = (lo - 6) & 0x0F;
    }
    let mut hi = (a >> 4) as i16 - (b >> 4) as i16 - lo_borrow as i16;
    if hi < 0 {
        hi -= 6;
    }
    let value = ((lo & 0x0F) | ((hi & 0x0F) << 4)) as u8;
    AluResult::with_nz(value, sub(a, b, carry).flags & (V | C))
}
