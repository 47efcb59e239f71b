//! Cycle-accurate NMOS 6502 and Ricoh 2A03/2A07 emulation.
//!
//! Every bus cycle the chip performs is issued through [`emu_core::Bus`],
//! dummy reads and writes included, so memory-mapped hardware sees exactly
//! what it would on a real board. The NES parts add the on-die DMA unit,
//! driven through [`DmaBus`].
//!
//! ```
//! use emu_core::SimpleBus;
//! use mos_6502::{Mos6502, Variant};
//!
//! let mut bus = SimpleBus::new();
//! bus.load(0x8000, &[0xA9, 0x42]); // LDA #$42
//! bus.set_word(0xFFFC, 0x8000);
//!
//! let mut cpu = Mos6502::new(Variant::Nmos6502);
//! cpu.power_on(&mut bus);
//! cpu.step(&mut bus);
//! assert_eq!(cpu.registers().a, 0x42);
//! ```

pub mod alu;
pub mod flags;

mod addressing;
mod cpu;
mod dma;
mod execute;
mod interrupt;
mod opcodes;
mod registers;
mod variant;

pub use cpu::{IRQ_VECTOR, Mos6502, NMI_VECTOR, RESET_VECTOR};
pub use dma::{DmaBus, DmaRequest};
pub use flags::Status;
pub use interrupt::{InterruptEdgeState, IrqSource};
pub use opcodes::{AddrMode, Op, OpcodeEntry, decode};
pub use registers::Registers;
pub use variant::{ParseVariantError, Variant};
