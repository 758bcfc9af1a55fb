/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::{btree_map::BTreeMap, btree_set::BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::{error, fmt};

use ::polonius_the_crab::prelude::*;

use crate::{
    addresses::{AddressRange, GlobalOffsetTable, Rom, Vram},
    collections::FindSettings,
    config::GlobalConfig,
    metadata::{ContextSymbol, GeneratedBy, OverlayCategoryName, SymbolAttributes},
    parent_segment_info::ParentSegmentInfo,
    relocation::RelocationInfo,
    section_type::SectionType,
};

use super::SymbolsSegment;

/// Addresses which look like pointers on N64 binaries but never are. They
/// must not produce symbols nor symbolic references.
const N64_DEFAULT_BANNED: [u32; 5] = [
    0x7FFFFFE0, // osInvalICache
    0x7FFFFFF0, // osInvalDCache, osWritebackDCache, osWritebackDCacheAll
    0x7FFFFFFF,
    0x80000010,
    0x80000020,
];

/// The root of all the symbol state: one global segment, one unknown segment
/// for addresses we can't place, and any number of overlay segments grouped
/// by category.
#[derive(Debug)]
pub struct Context {
    global_config: GlobalConfig,

    global_segment: SymbolsSegment,
    /// For symbols that we don't know where they come from.
    unknown_segment: SymbolsSegment,

    /// Outer key is the overlay category, inner key is the rom address the
    /// overlay's segment starts at.
    overlay_segments: BTreeMap<OverlayCategoryName, BTreeMap<Rom, SymbolsSegment>>,

    total_vram_range: AddressRange<Vram>,
    default_vram_ranges: bool,

    /// Stuff that looks like pointers, but the disassembler shouldn't count
    /// as pointers.
    banned_symbols: BTreeSet<Vram>,

    /// key: vram of the relocated word.
    reloc_infos_per_section: BTreeMap<SectionType, BTreeMap<Vram, RelocationInfo>>,

    got: GlobalOffsetTable,
}

impl Context {
    pub fn new(global_config: GlobalConfig) -> Self {
        // Arbitrary initial range, until the caller tells us the real one.
        let global_segment = SymbolsSegment::new(
            Some(AddressRange::new(Rom::new(0x0), Rom::new(0x1000))),
            AddressRange::new(Vram::new(0x80000000), Vram::new(0x80001000)),
            None,
        );
        let unknown_segment = SymbolsSegment::new_unknown_segment();

        let total_vram_range = *global_segment.vram_range();

        let mut reloc_infos_per_section = BTreeMap::new();
        for section_type in [
            SectionType::Text,
            SectionType::Data,
            SectionType::Rodata,
            SectionType::Bss,
        ] {
            reloc_infos_per_section.insert(section_type, BTreeMap::new());
        }

        Self {
            global_config,
            global_segment,
            unknown_segment,
            overlay_segments: BTreeMap::new(),
            total_vram_range,
            default_vram_ranges: true,
            banned_symbols: BTreeSet::new(),
            reloc_infos_per_section,
            got: GlobalOffsetTable::new(),
        }
    }
}

impl Context {
    #[must_use]
    pub const fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }
    #[must_use]
    pub const fn global_segment(&self) -> &SymbolsSegment {
        &self.global_segment
    }
    #[must_use]
    pub fn global_segment_mut(&mut self) -> &mut SymbolsSegment {
        &mut self.global_segment
    }
    #[must_use]
    pub const fn unknown_segment(&self) -> &SymbolsSegment {
        &self.unknown_segment
    }
    #[must_use]
    pub const fn overlay_segments(
        &self,
    ) -> &BTreeMap<OverlayCategoryName, BTreeMap<Rom, SymbolsSegment>> {
        &self.overlay_segments
    }
    #[must_use]
    pub const fn total_vram_range(&self) -> &AddressRange<Vram> {
        &self.total_vram_range
    }
    #[must_use]
    pub const fn got(&self) -> &GlobalOffsetTable {
        &self.got
    }

    fn widen_total_vram_range(&mut self, vram: &AddressRange<Vram>) {
        if self.default_vram_ranges {
            self.total_vram_range = *vram;
            self.default_vram_ranges = false;
        } else {
            self.total_vram_range.expand_range(vram);
        }
    }

    pub fn change_global_segment_ranges(
        &mut self,
        vrom: AddressRange<Rom>,
        vram: AddressRange<Vram>,
    ) {
        self.global_segment.change_ranges(vrom, vram);
        self.widen_total_vram_range(&vram);
    }

    pub fn add_overlay_segment(
        &mut self,
        category: OverlayCategoryName,
        vrom: AddressRange<Rom>,
        vram: AddressRange<Vram>,
    ) -> &mut SymbolsSegment {
        self.widen_total_vram_range(&vram);

        let segment = SymbolsSegment::new(Some(vrom), vram, Some(category.clone()));
        self.overlay_segments
            .entry(category)
            .or_default()
            .entry(vrom.start())
            .or_insert(segment)
    }
}

impl Context {
    pub fn fill_default_banned_symbols(&mut self) {
        self.banned_symbols
            .extend(N64_DEFAULT_BANNED.iter().map(|x| Vram::new(*x)));
    }

    pub fn add_banned_symbol(&mut self, vram: Vram) {
        self.banned_symbols.insert(vram);
    }

    #[must_use]
    pub fn is_address_banned(&self, vram: Vram) -> bool {
        self.banned_symbols.contains(&vram)
    }

    #[must_use]
    pub fn get_reloc_info(&self, vram: Vram, section_type: SectionType) -> Option<&RelocationInfo> {
        self.reloc_infos_per_section
            .get(&section_type)
            .and_then(|relocs| relocs.get(&vram))
    }

    pub fn add_reloc_info(
        &mut self,
        vram: Vram,
        section_type: SectionType,
        reloc_info: RelocationInfo,
    ) {
        self.reloc_infos_per_section
            .entry(section_type)
            .or_default()
            .insert(vram, reloc_info);
    }

    pub fn init_got_table(&mut self, plt_got: Vram, locals: Vec<u32>, globals: Vec<u32>) {
        self.got.init_tables(plt_got, locals, globals);

        let mut bound = Vec::new();
        for entry in self.got.globals() {
            let vram = Vram::new(entry.address());
            let sym = self.global_segment.add_symbol(
                vram,
                None,
                GeneratedBy::UserDeclared,
                None,
                false,
            );
            sym.set_user_declared();
            sym.add_attributes(SymbolAttributes::GOT | SymbolAttributes::GOT_GLOBAL);
            bound.push(vram);
        }
        self.got.bind_globals(&bound);
    }
}

impl Context {
    pub(crate) fn find_owned_segment(
        &self,
        info: &ParentSegmentInfo,
    ) -> Result<&SymbolsSegment, OwnedSegmentNotFoundError> {
        if let Some(overlay_name) = info.overlay_category_name() {
            if let Some(segments_per_rom) = self.overlay_segments.get(overlay_name) {
                if let Some(segment) = segments_per_rom.get(&info.segment_rom()) {
                    debug_assert!(segment.overlay_category() == Some(overlay_name));
                    return Ok(segment);
                }
            }
        } else if self.global_segment.in_vrom_range(info.segment_rom()) {
            // The global segment may contain more than one actual segment, so
            // checking for ranges is okay.
            return Ok(&self.global_segment);
        }
        Err(OwnedSegmentNotFoundError {})
    }

    pub(crate) fn find_owned_segment_mut(
        &mut self,
        info: &ParentSegmentInfo,
    ) -> Result<&mut SymbolsSegment, OwnedSegmentNotFoundError> {
        if let Some(overlay_name) = info.overlay_category_name() {
            if let Some(segments_per_rom) = self.overlay_segments.get_mut(overlay_name) {
                if let Some(segment) = segments_per_rom.get_mut(&info.segment_rom()) {
                    debug_assert!(segment.overlay_category() == Some(overlay_name));
                    return Ok(segment);
                }
            }
        } else if self.global_segment.in_vrom_range(info.segment_rom()) {
            return Ok(&mut self.global_segment);
        }
        Err(OwnedSegmentNotFoundError {})
    }

    /// The segment a referenced address should be looked up in, never failing:
    /// the caller's own overlay, then the global segment, then the unknown
    /// segment as a last resort.
    #[must_use]
    pub(crate) fn find_referenced_segment(
        &self,
        vram: Vram,
        info: &ParentSegmentInfo,
    ) -> &SymbolsSegment {
        if let Some(overlay_name) = info.overlay_category_name() {
            if let Some(segment) = self
                .overlay_segments
                .get(overlay_name)
                .and_then(|segments_per_rom| segments_per_rom.get(&info.segment_rom()))
            {
                if segment.in_vram_range(vram) {
                    return segment;
                }
            }
        }

        if self.global_segment.in_vram_range(vram) {
            return &self.global_segment;
        }

        &self.unknown_segment
    }

    #[must_use]
    pub(crate) fn find_referenced_segment_mut(
        &mut self,
        vram: Vram,
        info: &ParentSegmentInfo,
    ) -> &mut SymbolsSegment {
        find_referenced_segment_mut_impl(self, vram, info)
    }

    /// Symbol lookup honoring the segment precedence: the caller's overlay
    /// first, the global segment next, the unknown segment last. First match
    /// wins.
    #[must_use]
    pub fn find_referenced_symbol(
        &self,
        vram: Vram,
        info: &ParentSegmentInfo,
        settings: FindSettings,
    ) -> Option<&ContextSymbol> {
        if let Some(overlay_name) = info.overlay_category_name() {
            if let Some(segment) = self
                .overlay_segments
                .get(overlay_name)
                .and_then(|segments_per_rom| segments_per_rom.get(&info.segment_rom()))
            {
                if let Some(sym) = segment.get_symbol(vram, settings) {
                    return Some(sym);
                }
            }
        }

        if let Some(sym) = self.global_segment.get_symbol(vram, settings) {
            return Some(sym);
        }

        self.unknown_segment.get_symbol(vram, settings)
    }
}

fn find_referenced_segment_mut_impl<'ctx>(
    mut slf: &'ctx mut Context,
    vram: Vram,
    info: &ParentSegmentInfo,
) -> &'ctx mut SymbolsSegment {
    if let Some(overlay_name) = info.overlay_category_name() {
        polonius!(|slf| -> &'polonius mut SymbolsSegment {
            if let Some(segment) = slf
                .overlay_segments
                .get_mut(overlay_name)
                .and_then(|segments_per_rom| segments_per_rom.get_mut(&info.segment_rom()))
            {
                if segment.in_vram_range(vram) {
                    polonius_return!(segment);
                }
            }
        });
    }

    if slf.global_segment.in_vram_range(vram) {
        return &mut slf.global_segment;
    }

    &mut slf.unknown_segment
}

impl Context {
    /// Serializes every segment, returning `(file name, contents)` pairs: the
    /// main context file, the unknown segment's sibling, then one file per
    /// overlay segment.
    #[must_use]
    pub fn save_context(&self, stem: &str, suffix: &str) -> Vec<(String, String)> {
        let mut output = Vec::new();

        let mut main = String::new();
        self.global_segment.save_context(&mut main);
        output.push((format!("{}{}", stem, suffix), main));

        let mut unknown = String::new();
        self.unknown_segment.save_context(&mut unknown);
        output.push((format!("{}_unksegment{}", stem, suffix), unknown));

        for (category, segments_per_rom) in &self.overlay_segments {
            for (segment_rom, segment) in segments_per_rom {
                let mut contents = String::new();
                segment.save_context(&mut contents);
                output.push((
                    format!("{}_{}_{:06X}{}", stem, category, segment_rom.inner(), suffix),
                    contents,
                ));
            }
        }

        output
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub struct OwnedSegmentNotFoundError {}
impl fmt::Display for OwnedSegmentNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Can't find segment")
    }
}
impl error::Error for OwnedSegmentNotFoundError {}
impl From<OwnedSegmentNotFoundError> for fmt::Error {
    fn from(_value: OwnedSegmentNotFoundError) -> Self {
        Self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endian;
    use pretty_assertions::assert_eq;

    #[test]
    fn total_vram_range_widens_with_overlays() {
        let mut context = Context::new(GlobalConfig::new(Endian::Big));

        context.change_global_segment_ranges(
            AddressRange::new(Rom::new(0), Rom::new(0x100000)),
            AddressRange::new(Vram::new(0x80000000), Vram::new(0x80100000)),
        );
        context.add_overlay_segment(
            OverlayCategoryName::new("actors".into()),
            AddressRange::new(Rom::new(0x100000), Rom::new(0x101000)),
            AddressRange::new(Vram::new(0x80200000), Vram::new(0x80201000)),
        );

        assert_eq!(
            context.total_vram_range(),
            &AddressRange::new(Vram::new(0x80000000), Vram::new(0x80201000))
        );
    }

    #[test]
    fn overlays_with_same_vram_have_disjoint_symbols() {
        let mut context = Context::new(GlobalConfig::new(Endian::Big));

        let cat_a = OverlayCategoryName::new("A".into());
        let cat_b = OverlayCategoryName::new("B".into());
        let vram = AddressRange::new(Vram::new(0x80200000), Vram::new(0x80201000));

        let segment_a = context.add_overlay_segment(
            cat_a.clone(),
            AddressRange::new(Rom::new(0x1000), Rom::new(0x2000)),
            vram,
        );
        let sym_a = segment_a.add_symbol(
            Vram::new(0x80200000),
            None,
            GeneratedBy::UserDeclared,
            None,
            false,
        );
        *sym_a.user_declared_name_mut() = Some("a_sym".into());

        let segment_b = context.add_overlay_segment(
            cat_b.clone(),
            AddressRange::new(Rom::new(0x2000), Rom::new(0x3000)),
            vram,
        );
        let sym_b = segment_b.add_symbol(
            Vram::new(0x80200000),
            None,
            GeneratedBy::UserDeclared,
            None,
            false,
        );
        *sym_b.user_declared_name_mut() = Some("b_sym".into());

        let info_a = ParentSegmentInfo::new(Rom::new(0x1000), Some(cat_a));
        let info_b = ParentSegmentInfo::new(Rom::new(0x2000), Some(cat_b));

        let found_a = context
            .find_referenced_symbol(Vram::new(0x80200000), &info_a, FindSettings::new())
            .unwrap();
        let found_b = context
            .find_referenced_symbol(Vram::new(0x80200000), &info_b, FindSettings::new())
            .unwrap();

        assert_eq!(found_a.user_declared_name(), Some("a_sym"));
        assert_eq!(found_b.user_declared_name(), Some("b_sym"));
    }

    #[test]
    fn banned_addresses_are_flagged() {
        let mut context = Context::new(GlobalConfig::new(Endian::Big));
        context.fill_default_banned_symbols();

        assert!(context.is_address_banned(Vram::new(0x7FFFFFF0)));
        assert!(!context.is_address_banned(Vram::new(0x80000400)));
    }

    #[test]
    fn save_context_names_sibling_files() {
        let mut context = Context::new(GlobalConfig::new(Endian::Big));
        context.add_overlay_segment(
            OverlayCategoryName::new("actors".into()),
            AddressRange::new(Rom::new(0x9000), Rom::new(0xA000)),
            AddressRange::new(Vram::new(0x80200000), Vram::new(0x80201000)),
        );

        let saved = context.save_context("context", ".csv");
        let names: Vec<&str> = saved.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(
            names,
            [
                "context.csv",
                "context_unksegment.csv",
                "context_actors_009000.csv"
            ]
        );
    }
}
