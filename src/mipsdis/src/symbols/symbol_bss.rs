/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use crate::{
    addresses::{AddressRange, Rom, Size, Vram},
    context::{Context, OwnedSegmentNotFoundError},
    metadata::GeneratedBy,
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
};

use super::{
    display::{SymBssDisplay, SymBssDisplaySettings, SymDisplayError},
    Symbol,
};

/// A bss variable: an address and the amount of space it reserves, no bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBss {
    vram_range: AddressRange<Vram>,
    vrom: Option<Rom>,
    space: Size,
    parent_segment_info: ParentSegmentInfo,
}

impl SymbolBss {
    pub(crate) fn new(
        context: &mut Context,
        vram: Vram,
        vrom: Option<Rom>,
        space: Size,
        parent_segment_info: ParentSegmentInfo,
    ) -> Result<Self, OwnedSegmentNotFoundError> {
        let vram_range = AddressRange::new(vram, vram + space);

        let owned_segment = context.find_owned_segment_mut(&parent_segment_info)?;
        let metadata = owned_segment.add_symbol(
            vram,
            vrom,
            GeneratedBy::Autogenerated,
            Some(SectionType::Bss),
            false,
        );
        if metadata.autodetected_size().is_none() {
            *metadata.autodetected_size_mut() = Some(space);
        }
        metadata.set_defined();

        Ok(Self {
            vram_range,
            vrom,
            space,
            parent_segment_info,
        })
    }

    #[must_use]
    pub const fn space(&self) -> Size {
        self.space
    }

    #[must_use]
    pub const fn vrom(&self) -> Option<Rom> {
        self.vrom
    }

    pub fn display<'ctx, 'sym, 'flg>(
        &'sym self,
        context: &'ctx Context,
        settings: &'flg SymBssDisplaySettings,
    ) -> Result<SymBssDisplay<'ctx, 'sym, 'flg>, SymDisplayError> {
        Ok(SymBssDisplay::new(context, self, settings))
    }
}

impl Symbol for SymbolBss {
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
}
