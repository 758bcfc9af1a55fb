/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use crate::{
    addresses::{Size, Vram},
    collections::FindSettings,
    config::Endian,
    context::Context,
    metadata::ContextSymbol,
    relocation::RelocReferencedSym,
    section_type::SectionType,
    str_decoding::decode_string,
    symbols::{RomSymbol, Symbol, SymbolData},
};

use super::internal_common::{
    comment_padding, display_asm_comment, display_extra_label, display_referencee_symbols,
    display_symbol_label, WordComment,
};

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SymDataDisplaySettings {}

impl SymDataDisplaySettings {
    pub fn new() -> Self {
        Self {}
    }
}
impl Default for SymDataDisplaySettings {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SymDataDisplay<'ctx, 'sym, 'flg> {
    context: &'ctx Context,
    sym: &'sym SymbolData,
    _settings: &'flg SymDataDisplaySettings,
}

impl<'ctx, 'sym, 'flg> SymDataDisplay<'ctx, 'sym, 'flg> {
    pub(crate) fn new(
        context: &'ctx Context,
        sym: &'sym SymbolData,
        settings: &'flg SymDataDisplaySettings,
    ) -> Self {
        Self {
            context,
            sym,
            _settings: settings,
        }
    }
}

impl SymDataDisplay<'_, '_, '_> {
    fn find_exact(&self) -> FindSettings {
        FindSettings::new().with_allow_addend(false)
    }

    fn owned_symbol_at(&self, index: usize, byte: u32) -> Option<&ContextSymbol> {
        let owned_segment = self
            .context
            .find_owned_segment(self.sym.parent_segment_info())
            .ok()?;
        owned_segment.get_symbol(
            self.sym.vram_at_word(index) + Size::new(byte),
            self.find_exact(),
        )
    }

    fn is_byte(&self, metadata: &ContextSymbol) -> bool {
        metadata.is_byte() && !metadata.is_string()
    }

    fn is_short(&self, metadata: &ContextSymbol) -> bool {
        metadata.is_short()
    }

    fn is_float(&self, metadata: &ContextSymbol, index: usize) -> bool {
        if !metadata.is_float() {
            return false;
        }
        // Filter out NaN and infinity
        (self.sym.words()[index] & 0x7F800000) != 0x7F800000
    }

    fn is_double(&self, metadata: &ContextSymbol, index: usize) -> bool {
        if !metadata.is_double() {
            return false;
        }
        let words = self.sym.words();
        if index + 1 >= words.len() {
            return false;
        }
        let dword = ((words[index] as u64) << 32) | words[index + 1] as u64;
        // Filter out NaN and infinity
        if dword & 0x7FF0_0000_0000_0000 == 0x7FF0_0000_0000_0000 {
            return false;
        }
        // Prevent accidentally losing symbols
        self.owned_symbol_at(index + 1, 0).is_none()
    }

    fn is_jumptable(&self, metadata: &ContextSymbol) -> bool {
        // jumptables must have at least 3 labels
        self.sym.words().len() >= 3 && metadata.is_jumptable()
    }
}

impl SymDataDisplay<'_, '_, '_> {
    fn display_sym_plus_offset(
        &self,
        f: &mut fmt::Formatter<'_>,
        referenced: &ContextSymbol,
        value: u32,
    ) -> fmt::Result {
        write!(
            f,
            "{}",
            referenced.display_name(self.context.global_config())
        )?;
        let addend = value.wrapping_sub(referenced.vram().inner());
        if addend != 0 {
            write!(f, " + 0x{:X}", addend)?;
        }
        Ok(())
    }

    /// What goes after `.word` for a word that may reference something.
    fn display_word_value(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
        can_ref_addends: bool,
        can_ref_constants: bool,
    ) -> fmt::Result {
        let config = self.context.global_config();
        let w = self.sym.words()[index];
        let vram = self.sym.vram_at_word(index);

        // .elf relocated word
        if let Some(reloc_info) = self.context.get_reloc_info(vram, self.sym.section_type()) {
            match reloc_info.referenced_sym() {
                RelocReferencedSym::SectionVram(base) => {
                    let target = *base + Size::new(w);
                    if let Some(referenced) = self.context.find_referenced_symbol(
                        target,
                        self.sym.parent_segment_info(),
                        FindSettings::new().with_check_upper_limit(false),
                    ) {
                        return self.display_sym_plus_offset(f, referenced, target.inner());
                    }
                }
                RelocReferencedSym::SymName(name) => {
                    write!(f, "{}", name)?;
                    if w != 0 {
                        write!(f, " + 0x{:X}", w)?;
                    }
                    return Ok(());
                }
                RelocReferencedSym::Address(addr) => {
                    if let Some(referenced) = self.context.find_referenced_symbol(
                        *addr,
                        self.sym.parent_segment_info(),
                        self.find_exact(),
                    ) {
                        return self.display_sym_plus_offset(f, referenced, w);
                    }
                }
            }
            return write!(f, "0x{:08X}", w);
        }

        if config.remove_pointers() || self.context.is_address_banned(Vram::new(w))
        {
            return write!(f, "0x{:08X}", w);
        }

        // This word could be a reference to a symbol
        let referenced = self.context.find_referenced_symbol(
            Vram::new(w),
            self.sym.parent_segment_info(),
            FindSettings::new().with_allow_addend(can_ref_addends),
        );
        if let Some(referenced) = referenced {
            // Avoid using addends on functions
            if (!referenced.is_function() || referenced.vram().inner() == w)
                && !referenced.is_elf_notype()
            {
                return self.display_sym_plus_offset(f, referenced, w);
            }
        } else if can_ref_constants {
            if let Ok(owned_segment) = self
                .context
                .find_owned_segment(self.sym.parent_segment_info())
            {
                if let Some(constant) = owned_segment.get_constant(w) {
                    return write!(f, "{}", constant.display_name(config));
                }
            }
        }

        write!(f, "0x{:08X}", w)
    }

    /// A plain (or symbol-referencing) data word.
    fn display_nth_word(
        &self,
        f: &mut fmt::Formatter<'_>,
        metadata: &ContextSymbol,
        index: usize,
        can_ref_addends: bool,
        can_ref_constants: bool,
    ) -> Result<usize, fmt::Error> {
        let config = self.context.global_config();
        let w = self.sym.words()[index];
        let vram = self.sym.vram_at_word(index);

        if index != 0 {
            display_extra_label(f, self.context, self.owned_symbol_at(index, 0))?;
        }

        if self.is_jumptable(metadata) {
            let gp_config = config.gp_config();
            let target = if metadata.is_got() && config.pic() && gp_config.is_some() {
                Vram::new(
                    gp_config
                        .expect("Just checked")
                        .gp_value()
                        .inner()
                        .wrapping_add_signed(w as i32),
                )
            } else {
                Vram::new(w)
            };

            if let Some(label_sym) = self.context.find_referenced_symbol(
                target,
                self.sym.parent_segment_info(),
                self.find_exact(),
            ) {
                let dot_type = if config.pic() { ".gpword" } else { ".word" };
                display_asm_comment(f, config, Some(self.sym.rom_at_word(index)), vram, WordComment::U32(w))?;
                write!(
                    f,
                    " {} {}{}",
                    dot_type,
                    label_sym.display_name(config),
                    config.line_end()
                )?;
                return Ok(0);
            }
        }

        let word_comment = if self.sym.section_type() == SectionType::Rodata {
            WordComment::U32(w)
        } else {
            WordComment::No
        };
        display_asm_comment(f, config, Some(self.sym.rom_at_word(index)), vram, word_comment)?;
        write!(f, " .word ")?;
        self.display_word_value(f, index, can_ref_addends, can_ref_constants)?;
        write!(f, "{}", config.line_end())?;

        Ok(0)
    }

    fn display_nth_word_as_float(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
    ) -> Result<usize, fmt::Error> {
        let config = self.context.global_config();
        let w = self.sym.words()[index];

        if index != 0 {
            display_extra_label(f, self.context, self.owned_symbol_at(index, 0))?;
        }

        display_asm_comment(
            f,
            config,
            Some(self.sym.rom_at_word(index)),
            self.sym.vram_at_word(index),
            WordComment::U32(w),
        )?;
        write!(f, " .float {}{}", f32::from_bits(w), config.line_end())?;

        Ok(0)
    }

    fn display_nth_word_as_double(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
    ) -> Result<usize, fmt::Error> {
        let config = self.context.global_config();
        let words = self.sym.words();
        let dword = ((words[index] as u64) << 32) | words[index + 1] as u64;

        if index != 0 {
            display_extra_label(f, self.context, self.owned_symbol_at(index, 0))?;
        }

        display_asm_comment(
            f,
            config,
            Some(self.sym.rom_at_word(index)),
            self.sym.vram_at_word(index),
            WordComment::U64(dword),
        )?;
        write!(f, " .double {}{}", f64::from_bits(dword), config.line_end())?;

        Ok(1)
    }

    fn display_nth_word_as_string(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
    ) -> Result<Option<usize>, fmt::Error> {
        let config = self.context.global_config();
        let local_offset = index * 4;

        let (chunks, raw_size) =
            match decode_string(self.sym.raw_bytes(), local_offset, self.sym.encoding()) {
                Ok(x) => x,
                Err(_) => return Ok(None),
            };

        // To be a valid aligned string, the next word-aligned bytes need to
        // be zero.
        let check_start = local_offset + raw_size;
        let check_end = core::cmp::min((check_start & !3) + 4, self.sym.raw_bytes().len());
        if self.sym.raw_bytes()[check_start..check_end]
            .iter()
            .any(|b| *b != 0)
        {
            return Ok(None);
        }

        if index != 0 {
            display_extra_label(f, self.context, self.owned_symbol_at(index, 0))?;
        }

        display_asm_comment(
            f,
            config,
            Some(self.sym.rom_at_word(index)),
            self.sym.vram_at_word(index),
            WordComment::No,
        )?;
        write!(f, " ")?;

        let padding = comment_padding(config);
        for chunk in &chunks[..chunks.len() - 1] {
            write!(f, ".ascii \"{}\"{}", chunk, config.line_end())?;
            write!(f, "{:width$}", " ", width = padding)?;
        }
        write!(
            f,
            ".asciz \"{}\"{}",
            chunks[chunks.len() - 1],
            config.line_end()
        )?;

        // Pad the string up to the word boundary, unless it already ends on
        // one.
        if (raw_size + 1) % 4 != 0 {
            let (directive, value) = config
                .compiler()
                .map(|compiler| compiler.post_align_for_string())
                .unwrap_or((".balign", 4));
            write!(f, "{:width$}", " ", width = padding)?;
            write!(f, "{} {}{}", directive, value, config.line_end())?;
        }

        Ok(Some(raw_size / 4))
    }

    fn display_byte(&self, f: &mut fmt::Formatter<'_>, index: usize, j: u32) -> fmt::Result {
        let config = self.context.global_config();
        let w = self.sym.words()[index];

        let shift = match config.endian() {
            Endian::Big => 24 - j * 8,
            Endian::Little => j * 8,
        };
        let value = (w >> shift) & 0xFF;

        display_asm_comment(
            f,
            config,
            Some(self.sym.rom_at_word(index) + Size::new(j)),
            self.sym.vram_at_word(index) + Size::new(j),
            WordComment::No,
        )?;
        write!(f, " .byte 0x{:02X}{}", value, config.line_end())
    }

    fn display_short(&self, f: &mut fmt::Formatter<'_>, index: usize, j: u32) -> fmt::Result {
        let config = self.context.global_config();
        let w = self.sym.words()[index];

        let shift = match config.endian() {
            Endian::Big => 16 - j * 8,
            Endian::Little => j * 8,
        };
        let value = (w >> shift) & 0xFFFF;

        display_asm_comment(
            f,
            config,
            Some(self.sym.rom_at_word(index) + Size::new(j)),
            self.sym.vram_at_word(index) + Size::new(j),
            WordComment::No,
        )?;
        write!(f, " .short 0x{:04X}{}", value, config.line_end())
    }

    /// A word which has symbols in the middle of it, or whose symbol is
    /// byte/short typed, rendered as the fitting mix of `.byte`s and
    /// `.short`s.
    fn display_nth_word_as_bytes_and_shorts(
        &self,
        f: &mut fmt::Formatter<'_>,
        metadata: &ContextSymbol,
        index: usize,
        sym1: Option<&ContextSymbol>,
        sym2: Option<&ContextSymbol>,
        sym3: Option<&ContextSymbol>,
    ) -> Result<usize, fmt::Error> {
        if index != 0 {
            display_extra_label(f, self.context, self.owned_symbol_at(index, 0))?;
        }

        if sym1.is_some() || self.is_byte(metadata) || (!self.is_short(metadata) && sym3.is_some())
        {
            self.display_byte(f, index, 0)?;
            display_extra_label(f, self.context, sym1)?;
            self.display_byte(f, index, 1)?;
        } else {
            self.display_short(f, index, 0)?;
        }

        display_extra_label(f, self.context, sym2)?;

        let second_half_as_bytes = sym3.is_some()
            || sym2.is_some_and(|sym| sym.is_byte())
            || (self.is_byte(metadata) && sym2.is_none_or(|sym| !sym.is_short()));
        if second_half_as_bytes {
            self.display_byte(f, index, 2)?;
            display_extra_label(f, self.context, sym3)?;
            self.display_byte(f, index, 3)?;
        } else {
            self.display_short(f, index, 2)?;
        }

        Ok(0)
    }

    /// `.align 3` before a double, only on the compilers known to need it.
    fn display_prev_align(
        &self,
        f: &mut fmt::Formatter<'_>,
        metadata: &ContextSymbol,
        index: usize,
    ) -> fmt::Result {
        let config = self.context.global_config();

        if self.is_double(metadata, index) {
            if let Some(align) = config
                .compiler()
                .and_then(|compiler| compiler.prev_align_for_double())
            {
                write!(f, "{:width$}", " ", width = comment_padding(config))?;
                write!(f, ".align {}{}", align, config.line_end())?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for SymDataDisplay<'_, '_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.context.global_config();
        let owned_segment = self
            .context
            .find_owned_segment(self.sym.parent_segment_info())?;
        let metadata = owned_segment
            .get_symbol(self.sym.vram(), self.find_exact())
            .ok_or(fmt::Error)?;

        let can_ref_addends = config.produce_symbols_plus_offset()
            || owned_segment.data_sym_allows_addend_references(self.sym.vram());
        let can_ref_constants = owned_segment.data_sym_references_constants(self.sym.vram());

        display_referencee_symbols(f, self.context, metadata)?;
        self.display_prev_align(f, metadata, 0)?;
        display_symbol_label(f, self.context, metadata)?;

        let mut index = 0;
        while index < self.sym.words().len() {
            let sym1 = self.owned_symbol_at(index, 1);
            let sym2 = self.owned_symbol_at(index, 2);
            let sym3 = self.owned_symbol_at(index, 3);

            if index != 0 {
                self.display_prev_align(f, metadata, index)?;
            }

            // Check for symbols in the middle of this word
            let skip = if sym1.is_some()
                || sym2.is_some()
                || sym3.is_some()
                || self.is_byte(metadata)
                || self.is_short(metadata)
            {
                self.display_nth_word_as_bytes_and_shorts(f, metadata, index, sym1, sym2, sym3)?
            } else if self.is_float(metadata, index) {
                self.display_nth_word_as_float(f, index)?
            } else if self.is_double(metadata, index) {
                self.display_nth_word_as_double(f, index)?
            } else if metadata.is_string() {
                match self.display_nth_word_as_string(f, index)? {
                    Some(skip) => skip,
                    // Not a string after all
                    None => self.display_nth_word(
                        f,
                        metadata,
                        index,
                        can_ref_addends,
                        can_ref_constants,
                    )?,
                }
            } else {
                self.display_nth_word(f, metadata, index, can_ref_addends, can_ref_constants)?
            };

            index += skip + 1;
        }

        Ok(())
    }
}
