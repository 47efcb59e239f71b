//! Cycle-accurate CMOS 65C02 emulation, with the bus timing of the Atari
//! Lynx's 65SC02.
//!
//! Registers, flags and the ALU are shared with [`mos_6502`]. The CMOS part
//! adds the extra instructions and addressing modes, a BCD adder with valid
//! flags, WAI and STP, and turns every undefined opcode into a NOP.
//!
//! ```
//! use emu_core::SimpleBus;
//! use wdc_65c02::Wdc65c02;
//!
//! let mut bus = SimpleBus::new();
//! bus.load(0x0200, &[0x64, 0x10, 0xDB]); // STZ $10 / STP
//! bus.set_word(0xFFFC, 0x0200);
//!
//! let mut cpu = Wdc65c02::new();
//! cpu.power_on(&mut bus);
//! cpu.step(&mut bus);
//! cpu.step(&mut bus);
//! assert!(cpu.is_halted());
//! ```

mod addressing;
mod cpu;
mod execute;
mod opcodes;

pub use cpu::{IRQ_LINE, StopState, Wdc65c02};
pub use mos_6502::{Registers, Status};
pub use opcodes::{AddrMode, Op, OpcodeEntry, decode};
