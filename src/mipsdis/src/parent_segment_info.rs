/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use crate::{addresses::Rom, metadata::OverlayCategoryName};

/// Identifies the segment a section (or symbol) belongs to: the rom address
/// the segment starts at, plus the overlay category when it isn't the global
/// segment.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParentSegmentInfo {
    segment_rom: Rom,
    overlay_category_name: Option<OverlayCategoryName>,
}

impl ParentSegmentInfo {
    #[must_use]
    pub const fn new(
        segment_rom: Rom,
        overlay_category_name: Option<OverlayCategoryName>,
    ) -> Self {
        Self {
            segment_rom,
            overlay_category_name,
        }
    }

    #[must_use]
    pub const fn segment_rom(&self) -> Rom {
        self.segment_rom
    }
    #[must_use]
    pub const fn overlay_category_name(&self) -> Option<&OverlayCategoryName> {
        self.overlay_category_name.as_ref()
    }
}
