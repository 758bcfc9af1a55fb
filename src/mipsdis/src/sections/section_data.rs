/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_set::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    addresses::{AddressRange, Rom, RomVramRange, Size, Vram},
    collections::FindSettings,
    context::{Context, OwnedSegmentNotFoundError, SymbolsSegment},
    metadata::{ContextSymbol, SymbolType},
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
    symbols::{
        display::{SymDataDisplaySettings, SymDisplayError},
        Symbol, SymbolData,
    },
};

use super::Section;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DataSectionSettings {}

impl DataSectionSettings {
    pub fn new() -> Self {
        Self {}
    }
}
impl Default for DataSectionSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded data-like section. Also serves `.rodata`, which is just data the
/// text analyzer is allowed to find jumptables and literals in.
pub struct DataSection {
    name: String,

    ranges: RomVramRange,
    raw_bytes: Vec<u8>,

    section_type: SectionType,
    parent_segment_info: ParentSegmentInfo,

    data_symbols: Vec<SymbolData>,

    symbol_vrams: BTreeSet<Vram>,
}

impl DataSection {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        _settings: &DataSectionSettings,
        name: String,
        raw_bytes: Vec<u8>,
        rom: Rom,
        vram: Vram,
        section_type: SectionType,
        parent_segment_info: ParentSegmentInfo,
    ) -> Self {
        assert!(
            !raw_bytes.is_empty(),
            "Can't initialize a section with empty bytes. {:?} {:?}",
            rom,
            vram
        );
        let size = Size::new(raw_bytes.len() as u32);
        let rom_range = AddressRange::new(rom, rom + size);
        let vram_range = AddressRange::new(vram, vram + size);
        let ranges = RomVramRange::new(rom_range, vram_range);

        Self {
            name,
            ranges,
            raw_bytes,
            section_type,
            parent_segment_info,
            data_symbols: Vec::new(),
            symbol_vrams: BTreeSet::new(),
        }
    }

    pub fn new_rodata(
        settings: &DataSectionSettings,
        name: String,
        raw_bytes: Vec<u8>,
        rom: Rom,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
    ) -> Self {
        Self::new(
            settings,
            name,
            raw_bytes,
            rom,
            vram,
            SectionType::Rodata,
            parent_segment_info,
        )
    }

    #[must_use]
    pub fn data_symbols(&self) -> &[SymbolData] {
        &self.data_symbols
    }

    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    /// Splits the section into symbols and classifies every word.
    ///
    /// This may run again after other sections produced new pointer
    /// candidates; the symbol list is rebuilt from the current context state.
    pub fn analyze(&mut self, context: &mut Context) -> Result<(), OwnedSegmentNotFoundError> {
        self.data_symbols.clear();
        self.symbol_vrams.clear();

        let (cut_points, outgoing_pointers) = self.scan_words(context)?;

        {
            let segment = context.find_owned_segment_mut(&self.parent_segment_info)?;
            // Candidates that turned into symbols here are settled; newly
            // seen pointers wait for whichever section owns their target.
            for vram in &cut_points {
                segment.pop_pointer_in_data_reference(*vram);
            }
            for pointer in outgoing_pointers {
                segment.add_pointer_in_data_reference(pointer);
            }
        }

        self.build_symbols(context, cut_points)
    }

    /// A symbol can only start word-aligned and strictly inside the section.
    fn record_cut_point(&self, cut_points: &mut BTreeSet<Vram>, vram: Vram) {
        if vram.inner() % 4 != 0 {
            return;
        }

        let offset = (vram - self.ranges.vram().start()).inner();
        if offset >= 0 && (offset as usize) < self.raw_bytes.len() {
            cut_points.insert(vram);
        }
    }

    /// When a string-typed symbol sits at this word: the string's byte
    /// length counted from here, terminator included.
    fn string_span_starting_at(
        &self,
        sym: Option<&ContextSymbol>,
        local_offset: usize,
    ) -> Option<usize> {
        let sym = sym?;
        if sym.sym_type() != Some(&SymbolType::CString) {
            return None;
        }

        self.raw_bytes[local_offset..]
            .iter()
            .position(|byte| *byte == 0)
            .map(|terminator| terminator + 1)
    }

    /// One pass over the words, deciding where the section gets cut into
    /// symbols and which word values look like pointers into other sections.
    fn scan_words(
        &self,
        context: &Context,
    ) -> Result<(BTreeSet<Vram>, Vec<Vram>), OwnedSegmentNotFoundError> {
        let segment = context.find_owned_segment(&self.parent_segment_info)?;
        let endian = context.global_config().endian();
        let section_start = self.ranges.vram().start();
        let whole_word = FindSettings::new().with_allow_addend(false);

        // The section itself always is a symbol.
        let mut cut_points = BTreeSet::from([section_start]);
        let mut outgoing_pointers: Vec<Vram> = Vec::new();

        // Bytes still belonging to a string that started on an earlier word.
        // Such words can neither hold pointers nor open new symbols.
        let mut string_bytes_left = 0usize;

        // A misaligned section keeps its leading bytes in the first symbol.
        let mut local_offset = (4 - (section_start.inner() % 4) as usize) % 4;
        while local_offset + 4 <= self.raw_bytes.len() {
            let cursor = section_start + Size::new(local_offset as u32);
            let known_here: [Option<&ContextSymbol>; 4] = core::array::from_fn(|byte| {
                segment.get_symbol(cursor + Size::new(byte as u32), whole_word)
            });

            if string_bytes_left == 0 {
                if let Some(span) = self.string_span_starting_at(known_here[0], local_offset) {
                    string_bytes_left = span;
                    self.record_cut_point(&mut cut_points, cursor);

                    // The string's own extent decides where the next symbol
                    // may start, preferring whatever size the user declared.
                    let past_string =
                        match known_here[0].and_then(|sym| sym.user_declared_size()) {
                            Some(size) => cursor + size,
                            None => cursor + Size::new(span.next_multiple_of(4) as u32),
                        };
                    self.record_cut_point(&mut cut_points, past_string);
                }
            }

            if string_bytes_left == 0 {
                self.classify_word(
                    context,
                    segment,
                    &known_here,
                    cursor,
                    endian.word_from_bytes(&self.raw_bytes[local_offset..local_offset + 4]),
                    &mut cut_points,
                    &mut outgoing_pointers,
                );
            }

            string_bytes_left = string_bytes_left.saturating_sub(4);
            local_offset += 4;
        }

        Ok((cut_points, outgoing_pointers))
    }

    /// Pointer detection for a single word, plus cut points for any symbol
    /// already known to live in it.
    #[allow(clippy::too_many_arguments)]
    fn classify_word(
        &self,
        context: &Context,
        segment: &SymbolsSegment,
        known_here: &[Option<&ContextSymbol>; 4],
        cursor: Vram,
        value: u32,
        cut_points: &mut BTreeSet<Vram>,
        outgoing_pointers: &mut Vec<Vram>,
    ) {
        let owner = known_here[0];
        let word_is_whole = known_here[1..].iter().all(Option::is_none);

        // Only an uncut word whose symbol kind may hold references gets
        // treated as a potential pointer.
        let searchable = word_is_whole
            && owner.map_or(true, |sym| {
                sym.sym_type().is_none_or(SymbolType::can_reference_symbols)
            });

        if searchable {
            let target = Vram::new(value);

            if !context.is_address_banned(target) {
                if self.ranges.in_vram_range(target) {
                    // A self-referencing word cuts this very section, except
                    // when the target falls inside a bigger known symbol.
                    let inside_other_sym = segment
                        .get_symbol(target, FindSettings::new())
                        .is_some_and(|sym| sym.vram() != target);
                    if !inside_other_sym {
                        self.record_cut_point(cut_points, target);
                    }
                } else if context.total_vram_range().in_range(target)
                    && context
                        .find_referenced_symbol(
                            target,
                            &self.parent_segment_info,
                            FindSettings::new(),
                        )
                        .is_none()
                {
                    // Unresolved and plausible: hand it to whichever section
                    // owns that address.
                    outgoing_pointers.push(target);
                }
            }
        }

        for (byte, slot) in known_here.iter().enumerate() {
            match slot {
                Some(sym) => {
                    self.record_cut_point(cut_points, sym.vram());
                    if let Some(size) = sym.user_declared_size() {
                        self.record_cut_point(cut_points, sym.vram() + size);
                    }
                }
                None if byte == 0 => {
                    if segment.is_vram_a_possible_pointer_in_data(cursor) {
                        self.record_cut_point(cut_points, cursor);
                    }
                }
                None => {}
            }
        }
    }

    /// Cuts the byte buffer at every recorded point and registers one data
    /// symbol per slice.
    fn build_symbols(
        &mut self,
        context: &mut Context,
        cut_points: BTreeSet<Vram>,
    ) -> Result<(), OwnedSegmentNotFoundError> {
        let section_start = self.ranges.vram().start();
        let section_rom = self.ranges.rom().start();

        let cuts: Vec<Vram> = cut_points.into_iter().collect();
        for (i, sym_vram) in cuts.iter().enumerate() {
            let begin = (*sym_vram - section_start).inner() as usize;
            let end = cuts
                .get(i + 1)
                .map(|next| (*next - section_start).inner() as usize)
                .unwrap_or(self.raw_bytes.len());
            debug_assert!(
                begin < end,
                "{:?} {} {} {}",
                section_rom,
                section_start,
                begin,
                end,
            );

            self.symbol_vrams.insert(*sym_vram);

            let sym = SymbolData::new(
                context,
                self.raw_bytes[begin..end].into(),
                section_rom + Size::new(begin as u32),
                *sym_vram,
                self.parent_segment_info.clone(),
                self.section_type,
            )?;

            self.data_symbols.push(sym);
        }

        Ok(())
    }

    pub fn disassemble(
        &self,
        context: &Context,
        settings: &SymDataDisplaySettings,
    ) -> Result<String, SymDisplayError> {
        use core::fmt::Write;

        let mut output = String::new();
        for (i, sym) in self.data_symbols.iter().enumerate() {
            if i != 0 {
                output.push_str(context.global_config().line_end());
            }
            let _ = write!(output, "{}", sym.display(context, settings)?);
        }
        Ok(output)
    }
}

impl Section for DataSection {
    fn name(&self) -> &str {
        &self.name
    }

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

    fn symbol_list(&self) -> &[impl Symbol] {
        &self.data_symbols
    }

    fn symbols_vrams(&self) -> &BTreeSet<Vram> {
        &self.symbol_vrams
    }
}
