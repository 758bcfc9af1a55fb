/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;

use crate::addresses::Vram;

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum RelocReferencedSym {
    /// The address of the referenced symbol itself.
    Address(Vram),
    /// The start of the section the referenced symbol lives in; the word's
    /// value is an offset into that section.
    SectionVram(Vram),
    /// A raw name the reloc provider handed us.
    SymName(String),
}
