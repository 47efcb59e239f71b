//! Chip variants sharing the NMOS core.

use std::fmt;
use std::str::FromStr;

/// Which NMOS 6502 derivative is being emulated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    /// Stock NMOS 6502 with working decimal mode.
    Nmos6502,
    /// NTSC NES/Famicom CPU: decimal mode disconnected, DMA unit attached.
    #[default]
    Ricoh2A03,
    /// PAL NES CPU. Like the 2A03, but the DMA unit's idle cycles do not
    /// re-read the halted address.
    Ricoh2A07,
}

impl Variant {
    /// Whether ADC/SBC honor the D flag.
    #[must_use]
    pub const fn has_decimal_mode(self) -> bool {
        matches!(self, Self::Nmos6502)
    }

    /// Whether DMA halt/alignment cycles repeat the CPU's pending read.
    #[must_use]
    pub const fn dma_repeats_reads(self) -> bool {
        !matches!(self, Self::Ricoh2A07)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nmos6502 => "6502",
            Self::Ricoh2A03 => "2a03",
            Self::Ricoh2A07 => "2a07",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a variant name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown 6502 variant `{0}` (expected 6502, 2a03 or 2a07)")]
pub struct ParseVariantError(String);

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "6502" | "nmos" | "nmos6502" => Ok(Self::Nmos6502),
            "2a03" | "rp2a03" | "ntsc" => Ok(Self::Ricoh2A03),
            "2a07" | "rp2a07" | "pal" => Ok(Self::Ricoh2A07),
            _ => Err(ParseVariantError(s.to_owned())),
        }
    }
}
