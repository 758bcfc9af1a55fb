/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::vec::Vec;

use crate::{
    addresses::{AddressRange, Rom, RomVramRange, Size, Vram, VramOffset},
    collections::FindSettings,
    context::{Context, OwnedSegmentNotFoundError, SymbolsSegment},
    metadata::{GeneratedBy, SymbolIndex},
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
    str_decoding::{decode_string, Encoding},
    symbols::{RomSymbol, Symbol},
};

use super::display::{SymDataDisplay, SymDataDisplaySettings, SymDisplayError};

/// A data or rodata variable and the bytes backing it.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolData {
    ranges: RomVramRange,
    raw_bytes: Vec<u8>,
    words: Vec<u32>,
    parent_segment_info: ParentSegmentInfo,
    section_type: SectionType,
    encoding: Encoding,
}

impl SymbolData {
    pub(crate) fn new(
        context: &mut Context,
        raw_bytes: Vec<u8>,
        rom: Rom,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
        section_type: SectionType,
    ) -> Result<Self, OwnedSegmentNotFoundError> {
        let size = Size::new(raw_bytes.len() as u32);
        let rom_range = AddressRange::new(rom, rom + size);
        let vram_range = AddressRange::new(vram, vram + size);
        let ranges = RomVramRange::new(rom_range, vram_range);

        let endian = context.global_config().endian();
        let encoding = context.global_config().string_encoding();
        let pic = context.global_config().pic();
        let gp_value = context.global_config().gp_config().map(|x| x.gp_value());

        let words: Vec<u32> = raw_bytes
            .chunks_exact(4)
            .map(|b| endian.word_from_bytes(b))
            .collect();

        let owned_segment = context.find_owned_segment_mut(&parent_segment_info)?;
        let metadata = owned_segment.add_symbol(
            vram,
            Some(rom),
            GeneratedBy::Autogenerated,
            Some(section_type),
            false,
        );
        *metadata.autodetected_size_mut() = Some(size);
        metadata.set_defined();

        // Mark sub-symbols contained in these bytes as seen.
        for offset in 1..raw_bytes.len() as u32 {
            if let Some(mid_sym) = owned_segment.get_symbol_mut(
                vram + Size::new(offset),
                FindSettings::new().with_allow_addend(false),
            ) {
                mid_sym.update_rom(Some(rom + Size::new(offset)));
                mid_sym.update_section_type(Some(section_type));
                mid_sym.set_defined();
            }
        }

        Self::validate_float(owned_segment, vram, &words);
        Self::validate_double(owned_segment, vram, &words);
        Self::validate_string(owned_segment, vram, &raw_bytes, encoding);

        let sym = Self {
            ranges,
            raw_bytes,
            words,
            parent_segment_info,
            section_type,
            encoding,
        };
        sym.collect_and_apply_references(context, pic, gp_value.map(|x| x.inner()))?;

        Ok(sym)
    }

    /// Drops the `Float32` guess when the word is NaN or infinity.
    fn validate_float(
        owned_segment: &mut SymbolsSegment,
        vram: Vram,
        words: &[u32],
    ) {
        let find = FindSettings::new().with_allow_addend(false);
        let is_float = owned_segment
            .get_symbol(vram, find)
            .is_some_and(|sym| sym.is_float() && sym.user_declared_type().is_none());
        if !is_float {
            return;
        }

        let valid = words
            .first()
            .is_some_and(|w| (w & 0x7F800000) != 0x7F800000);
        if !valid {
            if let Some(sym) = owned_segment.get_symbol_mut(vram, find) {
                sym.clear_autodetected_type();
            }
        }
    }

    /// Drops the `Float64` guess when the words can't actually hold doubles.
    fn validate_double(
        owned_segment: &mut SymbolsSegment,
        vram: Vram,
        words: &[u32],
    ) {
        let find = FindSettings::new().with_allow_addend(false);
        let is_double = owned_segment
            .get_symbol(vram, find)
            .is_some_and(|sym| sym.is_double() && sym.user_declared_type().is_none());
        if !is_double {
            return;
        }

        let mut valid = words.len() % 2 == 0 && vram.inner() % 8 == 0;
        if valid {
            for i in (0..words.len()).step_by(2) {
                let dword = ((words[i] as u64) << 32) | words[i + 1] as u64;
                if dword & 0x7FF0_0000_0000_0000 == 0x7FF0_0000_0000_0000 {
                    valid = false;
                    break;
                }
                // A symbol splitting the pair also disqualifies it.
                if owned_segment
                    .get_symbol(vram + Size::new(i as u32 * 4 + 4), find)
                    .is_some()
                {
                    valid = false;
                    break;
                }
            }
        }

        if !valid {
            if let Some(sym) = owned_segment.get_symbol_mut(vram, find) {
                sym.clear_autodetected_type();
            }
        }
    }

    /// Latches the failed-decoding flag when a `CString` guess doesn't hold.
    fn validate_string(
        owned_segment: &mut SymbolsSegment,
        vram: Vram,
        raw_bytes: &[u8],
        encoding: Encoding,
    ) {
        let find = FindSettings::new().with_allow_addend(false);
        let is_string = owned_segment
            .get_symbol(vram, find)
            .is_some_and(|sym| sym.is_string());
        if !is_string {
            return;
        }

        if !string_decodes_cleanly(raw_bytes, encoding) {
            if let Some(sym) = owned_segment.get_symbol_mut(vram, find) {
                sym.downgrade_string_to_word();
            }
        }
    }

    /// Two-phase reference walk: first read which words resolve to symbols
    /// (or jumptable entries), then install references and labels.
    fn collect_and_apply_references(
        &self,
        context: &mut Context,
        pic: bool,
        gp_value: Option<u32>,
    ) -> Result<(), OwnedSegmentNotFoundError> {
        let find_exact = FindSettings::new().with_allow_addend(false);
        let self_index = SymbolIndex::new(self.parent_segment_info.clone(), self.vram());

        let (is_jumptable, is_got, should_search) = {
            let owned_segment = context.find_owned_segment(&self.parent_segment_info)?;
            let metadata = owned_segment.get_symbol(self.vram(), find_exact);
            let is_jumptable = metadata.is_some_and(|sym| sym.is_jumptable());
            let is_got = metadata.is_some_and(|sym| sym.is_got());
            let should_search = metadata.is_none_or(|sym| {
                sym.sym_type().is_none_or(|typ| typ.can_reference_symbols())
            });
            (is_jumptable && self.words.len() >= 3, is_got, should_search)
        };

        if self.ranges.rom().start().inner() % 4 != 0 {
            return Ok(());
        }

        let mut jumptable_labels = Vec::new();
        let mut referenced = Vec::new();

        for word in &self.words {
            let target = if is_jumptable && is_got && pic {
                match gp_value {
                    Some(gp) => Vram::new(gp.wrapping_add_signed(*word as i32)),
                    None => continue,
                }
            } else {
                Vram::new(*word)
            };

            if context.is_address_banned(target) {
                continue;
            }

            if is_jumptable {
                jumptable_labels.push(target);
            } else if should_search
                && context
                    .find_referenced_symbol(target, &self.parent_segment_info, find_exact)
                    .is_some()
            {
                referenced.push(target);
            }
        }

        for target in jumptable_labels {
            let segment = context.find_referenced_segment_mut(target, &self.parent_segment_info);
            let label = segment.add_jumptable_label(target, None, GeneratedBy::Autogenerated);
            label.add_reference_symbol(self_index.clone());
        }
        for target in referenced {
            let segment = context.find_referenced_segment_mut(target, &self.parent_segment_info);
            if let Some(sym) = segment.get_symbol_mut(target, find_exact) {
                sym.add_reference_symbol(self_index.clone());
            }
        }

        Ok(())
    }
}

/// Checks that every string in the buffer decodes and is zero padded up to
/// the next word boundary, the same way emission walks them.
fn string_decodes_cleanly(raw_bytes: &[u8], encoding: Encoding) -> bool {
    let mut offset = 0;
    while offset < raw_bytes.len() {
        match decode_string(raw_bytes, offset, encoding) {
            Ok((_, raw_size)) => {
                let check_start = offset + raw_size;
                let check_end = core::cmp::min((check_start & !3) + 4, raw_bytes.len());
                if raw_bytes[check_start..check_end].iter().any(|b| *b != 0) {
                    return false;
                }
                offset = check_end;
            }
            Err(_) => return false,
        }
    }
    true
}

impl SymbolData {
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    #[must_use]
    pub(crate) fn words(&self) -> &[u32] {
        &self.words
    }

    #[must_use]
    pub(crate) fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The vram the word at `index` renders at.
    #[must_use]
    pub(crate) fn vram_at_word(&self, index: usize) -> Vram {
        self.vram() + VramOffset::new(index as i32 * 4)
    }

    #[must_use]
    pub(crate) fn rom_at_word(&self, index: usize) -> Rom {
        self.ranges.rom().start() + Size::new(index as u32 * 4)
    }

    pub fn display<'ctx, 'sym, 'flg>(
        &'sym self,
        context: &'ctx Context,
        settings: &'flg SymDataDisplaySettings,
    ) -> Result<SymDataDisplay<'ctx, 'sym, 'flg>, SymDisplayError> {
        Ok(SymDataDisplay::new(context, self, settings))
    }
}

impl Symbol for SymbolData {
    fn vram_range(&self) -> &AddressRange<Vram> {
        self.ranges.vram()
    }

    fn parent_segment_info(&self) -> &ParentSegmentInfo {
        &self.parent_segment_info
    }

    #[must_use]
    fn section_type(&self) -> SectionType {
        self.section_type
    }
}

impl RomSymbol for SymbolData {
    #[must_use]
    fn rom_vram_range(&self) -> &RomVramRange {
        &self.ranges
    }
}
