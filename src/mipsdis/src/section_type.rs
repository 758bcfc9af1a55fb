/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

/// The kind of section a symbol or slice belongs to.
///
/// A symbol which hasn't been seen in any analyzed section yet carries no
/// section at all (`Option<SectionType>`); once it gains one it never
/// changes.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum SectionType {
    Text = 1,
    Data,
    Rodata,
    Bss,
}

impl SectionType {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            SectionType::Text => ".text",
            SectionType::Data => ".data",
            SectionType::Rodata => ".rodata",
            SectionType::Bss => ".bss",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ".text" | "text" => Some(SectionType::Text),
            ".data" | "data" => Some(SectionType::Data),
            ".rodata" | "rodata" => Some(SectionType::Rodata),
            ".bss" | "bss" => Some(SectionType::Bss),
            _ => None,
        }
    }
}
