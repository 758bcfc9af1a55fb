/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod section_bss;
mod section_data;
mod section_text;
mod trait_section;

pub use section_bss::BssSection;
pub use section_data::{DataSection, DataSectionSettings};
pub use section_text::{TextSection, TextSectionSettings};
pub use trait_section::Section;
