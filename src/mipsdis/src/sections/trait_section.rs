/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_set::BTreeSet;

use crate::{
    addresses::{AddressRange, Vram},
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
    symbols::Symbol,
};

pub trait Section {
    fn name(&self) -> &str;

    fn vram_range(&self) -> &AddressRange<Vram>;

    fn parent_segment_info(&self) -> &ParentSegmentInfo;

    #[must_use]
    fn section_type(&self) -> SectionType;

    fn symbol_list(&self) -> &[impl Symbol];

    fn symbols_vrams(&self) -> &BTreeSet<Vram>;
}
