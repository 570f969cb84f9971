//! Chip identification
//!
//! `GET_CHIP_ID` returns the part number byte followed by the revision byte.

use core::fmt;

/// Known CC debug targets: (chip ID byte, part name)
const KNOWN_CHIPS: &[(u8, &str)] = &[
    (0xA5, "CC2530"),
    (0xB5, "CC2531"),
    (0x95, "CC2533"),
    (0x8D, "CC2540"),
    (0x41, "CC2541"),
    (0x43, "CC2543"),
    (0x44, "CC2544"),
    (0x45, "CC2545"),
];

/// Decoded result of `GET_CHIP_ID`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipId {
    /// Part number byte
    pub chip: u8,
    /// Silicon revision byte
    pub revision: u8,
}

impl ChipId {
    /// Split the raw 16-bit value (chip in the high byte)
    pub const fn from_raw(raw: u16) -> Self {
        Self {
            chip: (raw >> 8) as u8,
            revision: raw as u8,
        }
    }

    /// Raw 16-bit value as returned by the target
    pub const fn raw(self) -> u16 {
        ((self.chip as u16) << 8) | self.revision as u16
    }

    /// Part name, if known
    pub fn name(self) -> Option<&'static str> {
        KNOWN_CHIPS
            .iter()
            .find(|(id, _)| *id == self.chip)
            .map(|(_, name)| *name)
    }

    /// A reading of all zeros or all ones means nothing answered
    pub const fn is_present(self) -> bool {
        !matches!(self.raw(), 0x0000 | 0xFFFF)
    }
}

impl From<u16> for ChipId {
    fn from(raw: u16) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (rev 0x{:02X})", name, self.revision),
            None => write!(
                f,
                "unknown chip 0x{:02X} (rev 0x{:02X})",
                self.chip, self.revision
            ),
        }
    }
}
