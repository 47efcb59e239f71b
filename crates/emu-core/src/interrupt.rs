//! Interrupt request lines.

/// Interrupt lines as seen by a CPU.
///
/// NMI is a single level; the CPU core does its own edge detection. IRQ is
/// wired-OR: each chip that can pull the line low owns one bit, and the
/// line is asserted while any unmasked bit is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptLines {
    /// NMI line level (true = asserted).
    pub nmi: bool,
    /// Asserted IRQ sources, one bit per source.
    pub irq: u8,
}

impl InterruptLines {
    /// True if any IRQ source selected by `mask` is asserted.
    #[must_use]
    pub const fn irq_asserted(self, mask: u8) -> bool {
        self.irq & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_respects_mask() {
        let lines = InterruptLines { nmi: false, irq: 0b0000_0100 };
        assert!(lines.irq_asserted(0xFF));
        assert!(!lines.irq_asserted(0b0000_0011));
        assert!(!InterruptLines::default().irq_asserted(0xFF));
    }
}
