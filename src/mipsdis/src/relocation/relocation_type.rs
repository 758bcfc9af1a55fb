/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use super::{RelocReferencedSym, RelocationInfo};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
#[allow(non_camel_case_types)]
pub enum RelocationType {
    /// Direct 32 bit. Symbol references in `.data`-like sections.
    R_MIPS_32 = 2,
    /// Direct 26 bit shifted. Direct function calls (`jal`s, `j`s, etc).
    R_MIPS_26 = 4,
    /// `%hi` reloc to be used on `lui`s.
    R_MIPS_HI16 = 5,
    /// The `%lo` pairing of a `R_MIPS_HI16`.
    R_MIPS_LO16 = 6,
    /// `$gp` relative reference to a small-section symbol.
    R_MIPS_GPREL16 = 7,
    /// An instruction referencing the global offset table.
    R_MIPS_GOT16 = 9,
    /// PC relative 16 bit. Branches.
    R_MIPS_PC16 = 10,
    /// GP relative 32 bit. Jumptable entries under PIC.
    R_MIPS_GPREL32 = 12,

    /// A hack to allow emitting hi/lo paired constants.
    R_CUSTOM_CONSTANT_HI = -1,
    /// A hack to allow emitting hi/lo paired constants.
    R_CUSTOM_CONSTANT_LO = -2,
}

impl RelocationType {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match *self {
            RelocationType::R_MIPS_32 => "R_MIPS_32",
            RelocationType::R_MIPS_26 => "R_MIPS_26",
            RelocationType::R_MIPS_HI16 => "R_MIPS_HI16",
            RelocationType::R_MIPS_LO16 => "R_MIPS_LO16",
            RelocationType::R_MIPS_GPREL16 => "R_MIPS_GPREL16",
            RelocationType::R_MIPS_GOT16 => "R_MIPS_GOT16",
            RelocationType::R_MIPS_PC16 => "R_MIPS_PC16",
            RelocationType::R_MIPS_GPREL32 => "R_MIPS_GPREL32",
            RelocationType::R_CUSTOM_CONSTANT_HI => "R_CUSTOM_CONSTANT_HI",
            RelocationType::R_CUSTOM_CONSTANT_LO => "R_CUSTOM_CONSTANT_LO",
        }
    }

    /// The `%op(...)` wrapper this reloc renders with, if any.
    #[must_use]
    pub(crate) const fn operation(&self) -> Option<&'static str> {
        match *self {
            RelocationType::R_MIPS_32 => None,
            RelocationType::R_MIPS_26 => None,
            RelocationType::R_MIPS_HI16 => Some("%hi"),
            RelocationType::R_MIPS_LO16 => Some("%lo"),
            RelocationType::R_MIPS_GPREL16 => Some("%gp_rel"),
            RelocationType::R_MIPS_GOT16 => Some("%got"),
            RelocationType::R_MIPS_PC16 => None,
            RelocationType::R_MIPS_GPREL32 => None,
            RelocationType::R_CUSTOM_CONSTANT_HI => None,
            RelocationType::R_CUSTOM_CONSTANT_LO => None,
        }
    }

    /// The expression appended after the symbol, for the constant hacks.
    #[must_use]
    pub(crate) const fn postfix(&self) -> &'static str {
        match *self {
            RelocationType::R_CUSTOM_CONSTANT_HI => " >> 16",
            RelocationType::R_CUSTOM_CONSTANT_LO => " & 0xFFFF",
            _ => "",
        }
    }

    #[must_use]
    pub fn allow_addends_on_ref(&self) -> bool {
        !matches!(
            self,
            RelocationType::R_MIPS_26 | RelocationType::R_MIPS_PC16
        )
    }

    #[must_use]
    pub fn new_reloc_info(self, referenced_sym: RelocReferencedSym) -> RelocationInfo {
        RelocationInfo::new(self, referenced_sym, 0)
    }

    #[must_use]
    pub fn new_reloc_info_with_addend(
        self,
        referenced_sym: RelocReferencedSym,
        addend: i32,
    ) -> RelocationInfo {
        RelocationInfo::new(self, referenced_sym, addend)
    }
}
