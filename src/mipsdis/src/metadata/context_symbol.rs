/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use alloc::collections::btree_set::BTreeSet;
use alloc::string::String;

use bitflags::bitflags;

use crate::{
    addresses::{Rom, Size, Vram},
    collections::SizedAddress,
    config::GlobalConfig,
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
};

use super::{OverlayCategoryName, SymbolNameDisplay, SymbolType};

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum GeneratedBy {
    /// This symbol was automatically generated by the disassembler
    Autogenerated,
    /// Declared externally by the user, but it may have not been found yet
    UserDeclared,
}

bitflags! {
    /// The boolean facts known about a symbol.
    #[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct SymbolAttributes: u16 {
        /// The symbol was found in one of the analyzed sections.
        const DEFINED = 1 << 0;
        const GOT = 1 << 1;
        const GOT_LOCAL = 1 << 2;
        const GOT_GLOBAL = 1 << 3;
        /// Owned by the unknown segment, or by a segment with no rom backing.
        const UNKNOWN_SEGMENT = 1 << 4;
        const ELF_NOTYPE = 1 << 5;
        /// The bytes of this `CString` failed to decode; it renders as words.
        const FAILED_STRING_DECODING = 1 << 6;
    }
}

/// Stable handle to a symbol living in some segment.
///
/// Symbols reference each other through these instead of through direct
/// pointers; resolution back to a name happens at emission time.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SymbolIndex {
    parent: ParentSegmentInfo,
    vram: Vram,
}

impl SymbolIndex {
    #[must_use]
    pub const fn new(parent: ParentSegmentInfo, vram: Vram) -> Self {
        Self { parent, vram }
    }

    #[must_use]
    pub const fn parent(&self) -> &ParentSegmentInfo {
        &self.parent
    }
    #[must_use]
    pub const fn vram(&self) -> Vram {
        self.vram
    }
}

/// The per-address symbol record.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSymbol {
    vram: Vram,
    rom: Option<Rom>,
    generated_by: GeneratedBy,

    user_declared_name: Option<String>,

    user_declared_type: Option<SymbolType>,
    autodetected_type: Option<SymbolType>,

    user_declared_size: Option<Size>,
    autodetected_size: Option<Size>,

    section_type: Option<SectionType>,

    attributes: SymbolAttributes,

    overlay_category: Option<OverlayCategoryName>,

    /// Functions referencing this symbol.
    reference_functions: BTreeSet<SymbolIndex>,
    /// Non-function symbols referencing this symbol.
    reference_symbols: BTreeSet<SymbolIndex>,
}

impl ContextSymbol {
    pub(crate) fn new(vram: Vram, generated_by: GeneratedBy) -> Self {
        Self {
            vram,
            rom: None,
            generated_by,
            user_declared_name: None,
            user_declared_type: None,
            autodetected_type: None,
            user_declared_size: None,
            autodetected_size: None,
            section_type: None,
            attributes: SymbolAttributes::empty(),
            overlay_category: None,
            reference_functions: BTreeSet::new(),
            reference_symbols: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn vram(&self) -> Vram {
        self.vram
    }

    #[must_use]
    pub const fn rom(&self) -> Option<Rom> {
        self.rom
    }
    pub(crate) fn update_rom(&mut self, rom: Option<Rom>) {
        if self.rom.is_none() {
            self.rom = rom;
        }
    }

    #[must_use]
    pub const fn generated_by(&self) -> GeneratedBy {
        self.generated_by
    }
    #[must_use]
    pub const fn is_autogenerated(&self) -> bool {
        matches!(self.generated_by, GeneratedBy::Autogenerated)
    }
    #[must_use]
    pub const fn is_user_declared(&self) -> bool {
        matches!(self.generated_by, GeneratedBy::UserDeclared)
    }
    pub(crate) fn set_user_declared(&mut self) {
        self.generated_by = GeneratedBy::UserDeclared;
    }

    #[must_use]
    pub fn user_declared_name(&self) -> Option<&str> {
        self.user_declared_name.as_deref()
    }
    pub fn user_declared_name_mut(&mut self) -> &mut Option<String> {
        &mut self.user_declared_name
    }

    #[must_use]
    pub fn sym_type(&self) -> Option<&SymbolType> {
        if let Some(t) = &self.user_declared_type {
            Some(t)
        } else {
            self.autodetected_type.as_ref()
        }
    }
    #[must_use]
    pub fn user_declared_type(&self) -> Option<&SymbolType> {
        self.user_declared_type.as_ref()
    }
    #[must_use]
    pub fn autodetected_type(&self) -> Option<&SymbolType> {
        self.autodetected_type.as_ref()
    }

    pub(crate) fn set_type(&mut self, new_type: SymbolType, generated_by: GeneratedBy) {
        match generated_by {
            GeneratedBy::Autogenerated => self.autodetected_type = Some(new_type),
            GeneratedBy::UserDeclared => self.user_declared_type = Some(new_type),
        }
    }

    /// Applies the type lattice.
    ///
    /// User-declared types are terminal: an autogenerated candidate never
    /// touches them. A user-declared candidate goes through the same lattice
    /// against the previous user declaration.
    pub(crate) fn upgrade_type(&mut self, candidate: SymbolType, generated_by: GeneratedBy) {
        match generated_by {
            GeneratedBy::Autogenerated => {
                if self.user_declared_type.is_none()
                    && SymbolType::upgrade(self.autodetected_type.as_ref(), &candidate)
                {
                    self.autodetected_type = Some(candidate);
                }
            }
            GeneratedBy::UserDeclared => {
                if SymbolType::upgrade(self.user_declared_type.as_ref(), &candidate) {
                    self.user_declared_type = Some(candidate);
                }
            }
        }
    }

    pub(crate) fn set_autodetected_type_if_unset(&mut self, candidate: SymbolType) {
        if self.autodetected_type.is_none() {
            self.autodetected_type = Some(candidate);
        }
    }

    /// `CString` that failed to decode turns into plain words.
    pub(crate) fn downgrade_string_to_word(&mut self) {
        if self.autodetected_type == Some(SymbolType::CString) {
            self.autodetected_type = Some(SymbolType::Word);
        }
        self.attributes |= SymbolAttributes::FAILED_STRING_DECODING;
    }

    /// A `Float64` symbol which violates the pairing rules loses its type.
    pub(crate) fn clear_autodetected_type(&mut self) {
        self.autodetected_type = None;
    }

    #[must_use]
    pub fn user_declared_size(&self) -> Option<Size> {
        self.user_declared_size
    }
    pub fn user_declared_size_mut(&mut self) -> &mut Option<Size> {
        &mut self.user_declared_size
    }
    #[must_use]
    pub fn autodetected_size(&self) -> Option<Size> {
        self.autodetected_size
    }
    pub(crate) fn autodetected_size_mut(&mut self) -> &mut Option<Size> {
        &mut self.autodetected_size
    }
    #[must_use]
    pub fn size(&self) -> Option<Size> {
        if let Some(siz) = self.user_declared_size {
            return Some(siz);
        }
        self.autodetected_size
    }

    #[must_use]
    pub const fn section_type(&self) -> Option<SectionType> {
        self.section_type
    }
    /// The section sticks once known.
    pub(crate) fn update_section_type(&mut self, section_type: Option<SectionType>) {
        if self.section_type.is_none() {
            self.section_type = section_type;
        }
    }
    /// Bss and text analysis know better than earlier guesses.
    pub(crate) fn force_section_type(&mut self, section_type: SectionType) {
        self.section_type = Some(section_type);
    }

    #[must_use]
    pub const fn attributes(&self) -> SymbolAttributes {
        self.attributes
    }
    pub(crate) fn add_attributes(&mut self, attributes: SymbolAttributes) {
        self.attributes |= attributes;
    }

    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.attributes.contains(SymbolAttributes::DEFINED)
    }
    pub(crate) fn set_defined(&mut self) {
        self.attributes |= SymbolAttributes::DEFINED;
    }

    #[must_use]
    pub fn is_got_global(&self) -> bool {
        self.attributes.contains(SymbolAttributes::GOT_GLOBAL)
    }
    #[must_use]
    pub fn is_got_local(&self) -> bool {
        self.attributes.contains(SymbolAttributes::GOT_LOCAL)
    }
    #[must_use]
    pub fn is_got(&self) -> bool {
        self.attributes.contains(SymbolAttributes::GOT)
    }
    #[must_use]
    pub fn unknown_segment(&self) -> bool {
        self.attributes.contains(SymbolAttributes::UNKNOWN_SEGMENT)
    }
    #[must_use]
    pub fn is_elf_notype(&self) -> bool {
        self.attributes.contains(SymbolAttributes::ELF_NOTYPE)
    }
    #[must_use]
    pub fn failed_string_decoding(&self) -> bool {
        self.attributes
            .contains(SymbolAttributes::FAILED_STRING_DECODING)
    }

    #[must_use]
    pub fn overlay_category(&self) -> Option<&OverlayCategoryName> {
        self.overlay_category.as_ref()
    }
    pub(crate) fn set_overlay_category(&mut self, overlay_category: Option<OverlayCategoryName>) {
        self.overlay_category = overlay_category;
    }

    #[must_use]
    pub const fn reference_functions(&self) -> &BTreeSet<SymbolIndex> {
        &self.reference_functions
    }
    pub(crate) fn add_reference_function(&mut self, index: SymbolIndex) {
        self.reference_functions.insert(index);
    }

    #[must_use]
    pub const fn reference_symbols(&self) -> &BTreeSet<SymbolIndex> {
        &self.reference_symbols
    }
    pub(crate) fn add_reference_symbol(&mut self, index: SymbolIndex) {
        self.reference_symbols.insert(index);
    }

    /// How much this symbol is referenced by something else
    #[must_use]
    pub fn reference_counter(&self) -> usize {
        self.reference_functions.len() + self.reference_symbols.len()
    }
}

impl ContextSymbol {
    #[must_use]
    pub fn is_function(&self) -> bool {
        self.sym_type() == Some(&SymbolType::Function)
    }
    #[must_use]
    pub fn is_branch_label(&self) -> bool {
        self.sym_type() == Some(&SymbolType::BranchLabel)
    }
    #[must_use]
    pub fn is_jumptable(&self) -> bool {
        self.sym_type() == Some(&SymbolType::Jumptable)
    }
    #[must_use]
    pub fn is_jumptable_label(&self) -> bool {
        self.sym_type() == Some(&SymbolType::JumptableLabel)
    }
    #[must_use]
    pub fn is_byte(&self) -> bool {
        self.sym_type() == Some(&SymbolType::Byte)
    }
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.sym_type() == Some(&SymbolType::Short)
    }
    #[must_use]
    pub fn is_float(&self) -> bool {
        self.sym_type() == Some(&SymbolType::Float32)
    }
    #[must_use]
    pub fn is_double(&self) -> bool {
        self.sym_type() == Some(&SymbolType::Float64)
    }
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.sym_type() == Some(&SymbolType::CString) && !self.failed_string_decoding()
    }

    /// Whether a `jal`/`j` target at this symbol should be trusted as a
    /// function start.
    #[must_use]
    pub fn is_trustable_function(&self, trust_user_functions: bool) -> bool {
        if self.unknown_segment() {
            return false;
        }
        if self.is_got_local() {
            return false;
        }

        match self.sym_type() {
            Some(SymbolType::Function) => true,
            None => trust_user_functions && self.is_user_declared(),
            Some(_) => false,
        }
    }

    pub fn display_name<'sym, 'conf>(
        &'sym self,
        config: &'conf GlobalConfig,
    ) -> SymbolNameDisplay<'sym, 'conf> {
        SymbolNameDisplay::new(self, config)
    }
}

impl SizedAddress for ContextSymbol {
    fn size(&self) -> Option<Size> {
        self.size()
    }
}

impl fmt::Display for ContextSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextSymbol {{ vram: 0x{} }}", self.vram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_declared_type_is_terminal() {
        let mut sym = ContextSymbol::new(Vram::new(0x80001000), GeneratedBy::UserDeclared);
        sym.set_type(SymbolType::Word, GeneratedBy::UserDeclared);

        sym.upgrade_type(SymbolType::Function, GeneratedBy::Autogenerated);
        assert_eq!(sym.sym_type(), Some(&SymbolType::Word));
    }

    #[test]
    fn defined_flag_is_monotonic() {
        let mut sym = ContextSymbol::new(Vram::new(0x80001000), GeneratedBy::Autogenerated);
        assert!(!sym.is_defined());
        sym.set_defined();
        assert!(sym.is_defined());
    }

    #[test]
    fn section_sticks_once_set() {
        let mut sym = ContextSymbol::new(Vram::new(0x80001000), GeneratedBy::Autogenerated);
        sym.update_section_type(Some(SectionType::Data));
        sym.update_section_type(Some(SectionType::Rodata));
        assert_eq!(sym.section_type(), Some(SectionType::Data));
    }

    #[test]
    fn failed_string_downgrades_to_word() {
        let mut sym = ContextSymbol::new(Vram::new(0x80001000), GeneratedBy::Autogenerated);
        sym.set_autodetected_type_if_unset(SymbolType::CString);
        sym.downgrade_string_to_word();

        assert_eq!(sym.sym_type(), Some(&SymbolType::Word));
        assert!(!sym.is_string());
    }
}
