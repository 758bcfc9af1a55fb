/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use crate::{
    addresses::{AddressRange, RomVramRange, Vram},
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
};

pub trait Symbol {
    fn vram_range(&self) -> &AddressRange<Vram>;

    fn parent_segment_info(&self) -> &ParentSegmentInfo;

    #[must_use]
    fn section_type(&self) -> SectionType;

    fn vram(&self) -> Vram {
        self.vram_range().start()
    }
}

/// A symbol which has actual bytes in the rom backing it up.
pub trait RomSymbol: Symbol {
    #[must_use]
    fn rom_vram_range(&self) -> &RomVramRange;
}
