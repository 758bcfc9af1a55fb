/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use crate::{
    addresses::{Rom, Vram},
    collections::FindSettings,
    config::GlobalConfig,
    context::Context,
    metadata::{ContextSymbol, SymbolType},
};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum WordComment {
    No,
    U32(u32),
    U64(u64),
}

/// The `/* <rom> <vram> <word> */` prefix every emitted line carries when
/// asm comments are enabled.
pub(crate) fn display_asm_comment(
    f: &mut fmt::Formatter<'_>,
    config: &GlobalConfig,
    rom: Option<Rom>,
    vram: Vram,
    word: WordComment,
) -> fmt::Result {
    if !config.asm_comment() {
        return Ok(());
    }

    write!(f, "/* ")?;
    if let Some(rom) = rom {
        write!(
            f,
            "{:0width$X} ",
            rom.inner(),
            width = config.asm_comment_offset_width() as usize
        )?;
    }
    write!(f, "{} ", vram)?;
    match word {
        WordComment::No => {}
        WordComment::U32(value) => write!(f, "{:08X} ", value)?,
        WordComment::U64(value) => write!(f, "{:016X} ", value)?,
    }

    write!(f, "*/")
}

/// Continuation padding which vertically aligns with lines that do carry an
/// asm comment.
pub(crate) fn comment_padding(config: &GlobalConfig) -> usize {
    if config.asm_comment() {
        22
    } else {
        1
    }
}

/// A comment block naming whoever references this symbol.
pub(crate) fn display_referencee_symbols(
    f: &mut fmt::Formatter<'_>,
    context: &Context,
    metadata: &ContextSymbol,
) -> fmt::Result {
    let config = context.global_config();
    if !config.asm_comment() || !config.asm_referencee_symbols() {
        return Ok(());
    }

    if !metadata.reference_functions().is_empty() {
        write!(f, "# Functions referencing this symbol:")?;
        for index in metadata.reference_functions() {
            if let Some(sym) = context.find_referenced_symbol(
                index.vram(),
                index.parent(),
                FindSettings::new().with_allow_addend(false),
            ) {
                write!(f, " {}", sym.display_name(config))?;
            }
        }
        return write!(f, "{}", config.line_end());
    }

    if !metadata.reference_symbols().is_empty() {
        write!(f, "# Symbols referencing this symbol:")?;
        for index in metadata.reference_symbols() {
            if let Some(sym) = context.find_referenced_symbol(
                index.vram(),
                index.parent(),
                FindSettings::new().with_allow_addend(false),
            ) {
                write!(f, " {}", sym.display_name(config))?;
            }
        }
        return write!(f, "{}", config.line_end());
    }

    Ok(())
}

/// The `glabel`/`dlabel`/`jlabel` macro this symbol's label uses.
pub(crate) fn symbol_label_macro<'conf>(
    config: &'conf GlobalConfig,
    metadata: &ContextSymbol,
) -> &'conf str {
    match metadata.sym_type() {
        Some(SymbolType::Function) => config.macro_labels().func(),
        Some(SymbolType::JumptableLabel) => config.macro_labels().jtbl_label(),
        _ => config.macro_labels().data(),
    }
}

/// The label block of a symbol: its macro label plus, optionally, a plain
/// `name:` echo so the symbol also works without the macro prelude.
pub(crate) fn display_symbol_label(
    f: &mut fmt::Formatter<'_>,
    context: &Context,
    metadata: &ContextSymbol,
) -> fmt::Result {
    let config = context.global_config();
    let name = metadata.display_name(config);

    write!(
        f,
        "{} {}{}",
        symbol_label_macro(config, metadata),
        name,
        config.line_end()
    )?;
    if config.asm_data_sym_as_label() {
        write!(f, "{}:{}", name, config.line_end())?;
    }

    Ok(())
}

/// Label block for a symbol discovered in the middle of another symbol's
/// bytes. Starts with a blank line so the new symbol stands out.
pub(crate) fn display_extra_label(
    f: &mut fmt::Formatter<'_>,
    context: &Context,
    metadata: Option<&ContextSymbol>,
) -> fmt::Result {
    let metadata = match metadata {
        Some(x) => x,
        None => return Ok(()),
    };
    let config = context.global_config();

    write!(f, "{}", config.line_end())?;
    display_symbol_label(f, context, metadata)
}
