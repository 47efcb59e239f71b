//! Interrupt sources and per-cycle edge detection.

use emu_core::InterruptLines;

/// Chips that can pull the NES IRQ line, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum IrqSource {
    /// Cartridge mapper or expansion port.
    External = 0x01,
    /// APU frame counter.
    FrameCounter = 0x02,
    /// APU sample channel (end of sample).
    Dmc = 0x04,
    /// Famicom Disk System adapter.
    FdsDisk = 0x08,
    /// Expansion sound board.
    Epsm = 0x10,
}

impl IrqSource {
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

/// NMI edge and IRQ level tracking, sampled at the end of every cycle.
///
/// The CPU decides at the end of an instruction whether to enter an
/// interrupt based on what it saw one cycle earlier (`prev_*`), which is
/// how the real part behaves: the interrupt must be asserted before the
/// instruction's last cycle to be taken after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptEdgeState {
    prev_nmi_line: bool,
    need_nmi: bool,
    prev_need_nmi: bool,
    run_irq: bool,
    prev_run_irq: bool,
}

impl InterruptEdgeState {
    /// Sample the lines at the end of a cycle.
    pub fn end_cycle(&mut self, lines: InterruptLines, irq_mask: u8, interrupt_disable: bool) {
        self.prev_need_nmi = self.need_nmi;
        if !self.prev_nmi_line && lines.nmi {
            self.need_nmi = true;
        }
        self.prev_nmi_line = lines.nmi;

        self.prev_run_irq = self.run_irq;
        self.run_irq = lines.irq_asserted(irq_mask) && !interrupt_disable;
    }

    /// True if an interrupt sequence should follow the current instruction.
    #[must_use]
    pub const fn interrupt_due(&self) -> bool {
        self.prev_run_irq || self.prev_need_nmi
    }

    /// A taken branch ignores an IRQ that only became visible during its
    /// own last cycle, so one more instruction runs before the IRQ.
    pub fn defer_new_irq(&mut self) {
        if self.run_irq && !self.prev_run_irq {
            self.run_irq = false;
        }
    }

    /// Consume a pending NMI. Returns true if one was pending.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.need_nmi)
    }

    /// Forget the NMI sampled one cycle ago (BRK has just set I and the
    /// vector has already been chosen).
    pub fn clear_prev_nmi(&mut self) {
        self.prev_need_nmi = false;
    }

    #[must_use]
    pub const fn nmi_pending(&self) -> bool {
        self.need_nmi
    }

    #[must_use]
    pub const fn irq_pending(&self) -> bool {
        self.run_irq
    }
}
