/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use crate::{
    collections::FindSettings,
    context::Context,
    symbols::{Symbol, SymbolBss},
};

use super::internal_common::{
    display_asm_comment, display_referencee_symbols, display_symbol_label, WordComment,
};

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SymBssDisplaySettings {}

impl SymBssDisplaySettings {
    pub fn new() -> Self {
        Self {}
    }
}
impl Default for SymBssDisplaySettings {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SymBssDisplay<'ctx, 'sym, 'flg> {
    context: &'ctx Context,
    sym: &'sym SymbolBss,
    _settings: &'flg SymBssDisplaySettings,
}

impl<'ctx, 'sym, 'flg> SymBssDisplay<'ctx, 'sym, 'flg> {
    pub(crate) fn new(
        context: &'ctx Context,
        sym: &'sym SymbolBss,
        settings: &'flg SymBssDisplaySettings,
    ) -> Self {
        Self {
            context,
            sym,
            _settings: settings,
        }
    }
}

impl fmt::Display for SymBssDisplay<'_, '_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.context.global_config();
        let owned_segment = self
            .context
            .find_owned_segment(self.sym.parent_segment_info())?;
        let metadata = owned_segment
            .get_symbol(
                self.sym.vram(),
                FindSettings::new().with_allow_addend(false),
            )
            .ok_or(fmt::Error)?;

        display_referencee_symbols(f, self.context, metadata)?;
        display_symbol_label(f, self.context, metadata)?;

        display_asm_comment(
            f,
            config,
            self.sym.vrom(),
            self.sym.vram(),
            WordComment::No,
        )?;
        write!(f, " .space {}{}", self.sym.space(), config.line_end())
    }
}
