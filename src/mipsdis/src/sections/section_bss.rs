/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::{btree_map::BTreeMap, btree_set::BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    addresses::{AddressRange, Rom, Size, Vram},
    collections::FindSettings,
    context::{Context, OwnedSegmentNotFoundError},
    metadata::GeneratedBy,
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
    symbols::{display::{SymBssDisplaySettings, SymDisplayError}, Symbol, SymbolBss},
};

use super::Section;

/// The noload section: no bytes, just an address range whose variables have
/// to be discovered and sized.
pub struct BssSection {
    name: String,

    vram_range: AddressRange<Vram>,
    /// Bss usually has no rom backing, but overlays may reserve it.
    vrom_start: Option<Rom>,

    parent_segment_info: ParentSegmentInfo,

    bss_symbols: Vec<SymbolBss>,

    symbol_vrams: BTreeSet<Vram>,
}

impl BssSection {
    pub fn new(
        name: String,
        vram_range: AddressRange<Vram>,
        vrom_start: Option<Rom>,
        parent_segment_info: ParentSegmentInfo,
    ) -> Self {
        assert!(
            !vram_range.size().is_empty(),
            "Can't initialize zero-sized bss section. {:?}",
            vram_range
        );

        Self {
            name,
            vram_range,
            vrom_start,
            parent_segment_info,
            bss_symbols: Vec::new(),
            symbol_vrams: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn bss_total_size(&self) -> Size {
        self.vram_range.size()
    }

    #[must_use]
    pub fn bss_symbols(&self) -> &[SymbolBss] {
        &self.bss_symbols
    }

    /// Materializes one [`SymbolBss`] per bss variable, sizing each one by
    /// the distance to its next neighbor.
    ///
    /// Re-running this pass rebuilds the symbol list from the current state
    /// of the context, which is how pointer candidates discovered by later
    /// sections end up as variables here.
    pub fn analyze(&mut self, context: &mut Context) -> Result<(), OwnedSegmentNotFoundError> {
        self.bss_symbols.clear();
        self.symbol_vrams.clear();

        let bss_start = self.vram_range.start();
        let bss_end = self.vram_range.end();
        let find_exact = FindSettings::new().with_allow_addend(false);
        let find_covering = FindSettings::new()
            .with_allow_addend(context.global_config().produce_symbols_plus_offset());

        let offsets = {
            let owned_segment = context.find_owned_segment_mut(&self.parent_segment_info)?;

            // Check if the very start of the section has a bss variable and
            // create it if it doesn't exist yet.
            if owned_segment.get_symbol(bss_start, find_exact).is_none() {
                let sym = owned_segment.add_symbol(
                    bss_start,
                    self.vrom_start,
                    GeneratedBy::Autogenerated,
                    Some(SectionType::Bss),
                    false,
                );
                sym.set_defined();
            }

            // If something that could be a pointer found in data happens to be
            // in the middle of this section's address space, then consider it
            // a new bss variable.
            for pointer in
                owned_segment.get_and_pop_pointer_in_data_references_range(bss_start, bss_end)
            {
                // The symbol may already exist, e.g. when the user provided a
                // size which covers this address.
                if owned_segment.get_symbol(pointer, find_covering).is_none() {
                    let sym = owned_segment.add_symbol(
                        pointer,
                        None,
                        GeneratedBy::Autogenerated,
                        Some(SectionType::Bss),
                        false,
                    );
                    sym.set_defined();
                }
            }

            // The sizing algorithm needs the offset of each variable relative
            // to the section start, since a variable's size is decided by the
            // next variable's address. A user-declared size inserts an extra
            // boundary, so the variable before it stays capped.
            let mut offsets: BTreeMap<u32, bool> = BTreeMap::new();
            for (sym_vram, sym) in owned_segment.get_symbols_range_mut(bss_start, bss_end) {
                sym.force_section_type(SectionType::Bss);
                sym.set_defined();

                let offset = (*sym_vram - bss_start).inner() as u32;
                offsets.insert(offset, true);

                if let Some(size) = sym.user_declared_size() {
                    offsets.entry(offset + size.inner()).or_insert(false);
                }
            }
            offsets
        };

        let total_size = self.bss_total_size().inner();
        let sorted_offsets: Vec<(u32, bool)> = offsets.into_iter().collect();

        for (i, (offset, corresponds_to_symbol)) in sorted_offsets.iter().enumerate() {
            // Boundaries which only exist to cap the previous variable don't
            // emit anything themselves.
            if !corresponds_to_symbol || *offset >= total_size {
                continue;
            }

            let mut space = total_size - offset;
            if let Some((next_offset, _)) = sorted_offsets.get(i + 1) {
                if *next_offset <= total_size {
                    space = next_offset - offset;
                }
            }

            let sym_vram = bss_start + Size::new(*offset);
            let sym_vrom = self.vrom_start.map(|vrom| vrom + Size::new(*offset));
            let sym = SymbolBss::new(
                context,
                sym_vram,
                sym_vrom,
                Size::new(space),
                self.parent_segment_info.clone(),
            )?;

            self.symbol_vrams.insert(sym_vram);
            self.bss_symbols.push(sym);
        }

        Ok(())
    }

    pub fn disassemble(
        &self,
        context: &Context,
        settings: &SymBssDisplaySettings,
    ) -> Result<String, SymDisplayError> {
        use core::fmt::Write;

        let mut output = String::new();
        for (i, sym) in self.bss_symbols.iter().enumerate() {
            if i != 0 {
                output.push_str(context.global_config().line_end());
            }
            let _ = write!(output, "{}", sym.display(context, settings)?);
        }
        Ok(output)
    }
}

impl Section for BssSection {
    fn name(&self) -> &str {
        &self.name
    }

    fn vram_range(&self) -> &AddressRange<Vram> {
        &self.vram_range
    }

    fn parent_segment_info(&self) -> &ParentSegmentInfo {
        &self.parent_segment_info
    }

    #[must_use]
    fn section_type(&self) -> SectionType {
        SectionType::Bss
    }

    fn symbol_list(&self) -> &[impl Symbol] {
        &self.bss_symbols
    }

    fn symbols_vrams(&self) -> &BTreeSet<Vram> {
        &self.symbol_vrams
    }
}
