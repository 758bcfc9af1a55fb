/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use crate::{
    addresses::Vram,
    collections::FindSettings,
    context::Context,
    metadata::ContextSymbol,
    parent_segment_info::ParentSegmentInfo,
};

use super::{RelocReferencedSym, RelocationType};

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RelocationInfo {
    reloc_type: RelocationType,
    referenced_sym: RelocReferencedSym,
    addend: i32,
}

impl RelocationInfo {
    #[must_use]
    pub fn new(reloc_type: RelocationType, referenced_sym: RelocReferencedSym, addend: i32) -> Self {
        Self {
            reloc_type,
            referenced_sym,
            addend,
        }
    }

    #[must_use]
    pub const fn reloc_type(&self) -> RelocationType {
        self.reloc_type
    }
    #[must_use]
    pub const fn referenced_sym(&self) -> &RelocReferencedSym {
        &self.referenced_sym
    }
    #[must_use]
    pub const fn addend(&self) -> i32 {
        self.addend
    }

    /// `None` when the reloc can't be rendered standalone (section-relative
    /// relocs need the word's value, which only the data emitter has).
    pub fn display<'ctx, 'rel, 'prnt>(
        &'rel self,
        context: &'ctx Context,
        segment_info: &'prnt ParentSegmentInfo,
    ) -> Option<RelocationInfoDisplay<'ctx, 'rel, 'prnt>> {
        RelocationInfoDisplay::new(context, self, segment_info)
    }
}

#[derive(Debug, Clone, Copy)]
enum RelocSymState<'name, 'ctx> {
    LiteralSymName(&'name str),
    Sym(&'ctx ContextSymbol),
    // Kinda useful for debugging
    SymbolNotFound(Vram),
}

#[derive(Debug, Clone, Copy)]
pub struct RelocationInfoDisplay<'ctx, 'rel, 'prnt> {
    context: &'ctx Context,
    rel: &'rel RelocationInfo,
    _segment_info: &'prnt ParentSegmentInfo,
    reloc_sym_state: RelocSymState<'rel, 'ctx>,
}

impl<'ctx, 'rel, 'prnt> RelocationInfoDisplay<'ctx, 'rel, 'prnt> {
    pub fn new(
        context: &'ctx Context,
        rel: &'rel RelocationInfo,
        segment_info: &'prnt ParentSegmentInfo,
    ) -> Option<Self> {
        let reloc_sym_state = match &rel.referenced_sym {
            RelocReferencedSym::SymName(name) => RelocSymState::LiteralSymName(name),
            RelocReferencedSym::Address(vram) => {
                if let Some(sym) = context.find_referenced_symbol(
                    *vram,
                    segment_info,
                    FindSettings::new().with_allow_addend(false),
                ) {
                    RelocSymState::Sym(sym)
                } else {
                    RelocSymState::SymbolNotFound(*vram)
                }
            }
            RelocReferencedSym::SectionVram(..) => return None,
        };

        Some(Self {
            context,
            rel,
            _segment_info: segment_info,
            reloc_sym_state,
        })
    }
}

impl fmt::Display for RelocationInfoDisplay<'_, '_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation = self.rel.reloc_type.operation();

        if let Some(operation) = operation {
            write!(f, "{}(", operation)?;
        }

        match &self.reloc_sym_state {
            RelocSymState::LiteralSymName(name) => write!(f, "{}", name)?,
            RelocSymState::Sym(sym) => {
                write!(f, "{}", sym.display_name(self.context.global_config()))?
            }
            RelocSymState::SymbolNotFound(vram) => {
                write!(f, "/* ERROR: symbol for address 0x{} not found */", vram)?
            }
        }

        let addend = self.rel.addend;
        if addend != 0 {
            if addend < 0 {
                write!(f, " - 0x{:X}", -addend)?;
            } else {
                write!(f, " + 0x{:X}", addend)?;
            }
        }

        write!(f, "{}", self.rel.reloc_type.postfix())?;
        if operation.is_some() {
            write!(f, ")")?;
        }

        Ok(())
    }
}
