/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use alloc::string::ToString;
use rabbitizer::InstructionDisplayFlags;

use crate::{
    addresses::Size,
    collections::FindSettings,
    context::Context,
    metadata::SymbolType,
    symbols::{RomSymbol, Symbol, SymbolFunction},
};

use super::internal_common::{display_asm_comment, display_referencee_symbols, WordComment};

#[derive(Debug, Clone)]
pub struct FunctionDisplaySettings {
    display_flags: InstructionDisplayFlags,
}

impl FunctionDisplaySettings {
    pub fn new(display_flags: InstructionDisplayFlags) -> Self {
        Self { display_flags }
    }
}

#[derive(Clone, Copy)]
pub struct FunctionDisplay<'ctx, 'sym, 'flg> {
    context: &'ctx Context,
    sym: &'sym SymbolFunction,
    settings: &'flg FunctionDisplaySettings,
}

impl<'ctx, 'sym, 'flg> FunctionDisplay<'ctx, 'sym, 'flg> {
    pub(crate) fn new(
        context: &'ctx Context,
        sym: &'sym SymbolFunction,
        settings: &'flg FunctionDisplaySettings,
    ) -> Self {
        Self {
            context,
            sym,
            settings,
        }
    }
}

impl FunctionDisplay<'_, '_, '_> {
    /// Mid-function labels: branch targets and jumptable targets.
    fn display_label(&self, f: &mut fmt::Formatter<'_>, index: usize) -> fmt::Result {
        if index == 0 {
            return Ok(());
        }

        let config = self.context.global_config();
        let owned_segment = self
            .context
            .find_owned_segment(self.sym.parent_segment_info())?;
        let vram = self.sym.vram_range().start() + Size::new(index as u32 * 4);
        let metadata = match owned_segment
            .get_symbol(vram, FindSettings::new().with_allow_addend(false))
        {
            Some(x) => x,
            None => return Ok(()),
        };

        match metadata.sym_type() {
            Some(SymbolType::JumptableLabel) => {
                write!(
                    f,
                    "{} {}{}",
                    config.macro_labels().jtbl_label(),
                    metadata.display_name(config),
                    config.line_end()
                )
            }
            Some(SymbolType::BranchLabel) => {
                write!(f, "{}:{}", metadata.display_name(config), config.line_end())
            }
            Some(SymbolType::Function) => {
                write!(
                    f,
                    "{} {}{}",
                    config.macro_labels().func(),
                    metadata.display_name(config),
                    config.line_end()
                )
            }
            _ => Ok(()),
        }
    }

    fn display_instruction(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
        prev_instr_had_delay_slot: bool,
    ) -> fmt::Result {
        let config = self.context.global_config();
        let instr = &self.sym.instructions()[index];
        let ranges = self.sym.rom_vram_range();
        let rom = ranges.rom().start() + Size::new(index as u32 * 4);

        display_asm_comment(
            f,
            config,
            Some(rom),
            instr.vram(),
            WordComment::U32(self.sym.raw_words()[index]),
        )?;
        write!(f, " ")?;

        if prev_instr_had_delay_slot {
            write!(f, " ")?;
        }

        let imm_override = self.sym.relocs()[index].as_ref().and_then(|reloc| {
            reloc
                .display(self.context, self.sym.parent_segment_info())
                .map(|display| display.to_string())
        });

        write!(
            f,
            "{}{}",
            instr.display(&self.settings.display_flags, imm_override.as_deref(), 0),
            config.line_end()
        )
    }
}

impl fmt::Display for FunctionDisplay<'_, '_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.context.global_config();
        let owned_segment = self
            .context
            .find_owned_segment(self.sym.parent_segment_info())?;
        let metadata = owned_segment
            .get_symbol(
                self.sym.vram_range().start(),
                FindSettings::new().with_allow_addend(false),
            )
            .ok_or(fmt::Error)?;

        display_referencee_symbols(f, self.context, metadata)?;

        write!(
            f,
            "{} {}{}",
            config.macro_labels().func(),
            metadata.display_name(config),
            config.line_end()
        )?;

        let mut prev_instr_had_delay_slot = false;
        for index in 0..self.sym.instructions().len() {
            self.display_label(f, index)?;
            self.display_instruction(f, index, prev_instr_had_delay_slot)?;

            prev_instr_had_delay_slot =
                self.sym.instructions()[index].opcode().has_delay_slot();
        }

        Ok(())
    }
}
