//! Core traits and types shared by the CPU cores.
//!
//! A CPU sees the rest of the machine only through [`Bus`]: every cycle it
//! spends is one `read` or `write`, tagged with an [`AccessKind`]. The same
//! decode/execute code runs against the live bus (`Cpu::step`) or against a
//! [`RecordingBus`] that logs what would have happened (`Cpu::trace`).

mod bus;
mod cpu;
mod interrupt;
mod recording;

pub use bus::{AccessKind, Bus, SimpleBus};
pub use cpu::{Cpu, Trace};
pub use interrupt::InterruptLines;
pub use recording::{BusLog, BusOperation, RecordingBus, TRACE_CAPACITY};
