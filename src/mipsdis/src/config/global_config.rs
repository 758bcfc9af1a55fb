/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_set::BTreeSet;
use alloc::string::String;

use crate::str_decoding::Encoding;

use super::{Compiler, Endian, GpConfig, MacroLabels};

/// Every knob that changes what the disassembler emits.
///
/// This is plain owned state passed explicitly to whoever needs it. Outputs
/// must be a function of (bytes, splits, user symbols, this struct) and
/// nothing else.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct GlobalConfig {
    endian: Endian,
    compiler: Option<Compiler>,
    gp_config: Option<GpConfig>,

    produce_symbols_plus_offset: bool,
    trust_user_functions: bool,
    autogenerated_names_based_on_data_type: bool,

    asm_comment: bool,
    asm_comment_offset_width: u8,
    asm_data_sym_as_label: bool,
    asm_referencee_symbols: bool,

    remove_pointers: bool,
    ignore_branches: bool,
    ignore_word_list: BTreeSet<u8>,

    string_encoding: Encoding,
    line_end: String,
    macro_labels: MacroLabels,
}

impl GlobalConfig {
    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            compiler: None,
            gp_config: None,

            produce_symbols_plus_offset: false,
            trust_user_functions: true,
            autogenerated_names_based_on_data_type: true,

            asm_comment: true,
            asm_comment_offset_width: 6,
            asm_data_sym_as_label: false,
            asm_referencee_symbols: false,

            remove_pointers: false,
            ignore_branches: false,
            ignore_word_list: BTreeSet::new(),

            string_encoding: Encoding::EucJp,
            line_end: "\n".into(),
            macro_labels: MacroLabels::new(),
        }
    }

    #[must_use]
    pub const fn endian(&self) -> Endian {
        self.endian
    }
    pub fn with_endian(self, endian: Endian) -> Self {
        Self { endian, ..self }
    }

    #[must_use]
    pub const fn compiler(&self) -> Option<Compiler> {
        self.compiler
    }
    pub fn with_compiler(self, compiler: Option<Compiler>) -> Self {
        Self { compiler, ..self }
    }

    #[must_use]
    pub const fn gp_config(&self) -> Option<GpConfig> {
        self.gp_config
    }
    pub fn with_gp_config(self, gp_config: Option<GpConfig>) -> Self {
        Self { gp_config, ..self }
    }

    #[must_use]
    pub fn pic(&self) -> bool {
        self.gp_config.is_some_and(|x| x.pic())
    }

    #[must_use]
    pub const fn produce_symbols_plus_offset(&self) -> bool {
        self.produce_symbols_plus_offset
    }
    pub fn with_produce_symbols_plus_offset(self, produce_symbols_plus_offset: bool) -> Self {
        Self {
            produce_symbols_plus_offset,
            ..self
        }
    }

    #[must_use]
    pub const fn trust_user_functions(&self) -> bool {
        self.trust_user_functions
    }
    pub fn with_trust_user_functions(self, trust_user_functions: bool) -> Self {
        Self {
            trust_user_functions,
            ..self
        }
    }

    #[must_use]
    pub const fn autogenerated_names_based_on_data_type(&self) -> bool {
        self.autogenerated_names_based_on_data_type
    }
    pub fn with_autogenerated_names_based_on_data_type(
        self,
        autogenerated_names_based_on_data_type: bool,
    ) -> Self {
        Self {
            autogenerated_names_based_on_data_type,
            ..self
        }
    }

    #[must_use]
    pub const fn asm_comment(&self) -> bool {
        self.asm_comment
    }
    pub fn with_asm_comment(self, asm_comment: bool) -> Self {
        Self {
            asm_comment,
            ..self
        }
    }

    #[must_use]
    pub const fn asm_comment_offset_width(&self) -> u8 {
        self.asm_comment_offset_width
    }

    #[must_use]
    pub const fn asm_data_sym_as_label(&self) -> bool {
        self.asm_data_sym_as_label
    }
    pub fn with_asm_data_sym_as_label(self, asm_data_sym_as_label: bool) -> Self {
        Self {
            asm_data_sym_as_label,
            ..self
        }
    }

    #[must_use]
    pub const fn asm_referencee_symbols(&self) -> bool {
        self.asm_referencee_symbols
    }
    pub fn with_asm_referencee_symbols(self, asm_referencee_symbols: bool) -> Self {
        Self {
            asm_referencee_symbols,
            ..self
        }
    }

    #[must_use]
    pub const fn remove_pointers(&self) -> bool {
        self.remove_pointers
    }
    pub fn with_remove_pointers(self, remove_pointers: bool) -> Self {
        Self {
            remove_pointers,
            ..self
        }
    }

    #[must_use]
    pub const fn ignore_branches(&self) -> bool {
        self.ignore_branches
    }
    pub fn with_ignore_branches(self, ignore_branches: bool) -> Self {
        Self {
            ignore_branches,
            ..self
        }
    }

    #[must_use]
    pub const fn ignore_word_list(&self) -> &BTreeSet<u8> {
        &self.ignore_word_list
    }
    pub fn with_ignore_word_list(self, ignore_word_list: BTreeSet<u8>) -> Self {
        Self {
            ignore_word_list,
            ..self
        }
    }

    #[must_use]
    pub const fn string_encoding(&self) -> Encoding {
        self.string_encoding
    }
    pub fn with_string_encoding(self, string_encoding: Encoding) -> Self {
        Self {
            string_encoding,
            ..self
        }
    }

    #[must_use]
    pub fn line_end(&self) -> &str {
        &self.line_end
    }
    pub fn with_line_end(self, line_end: String) -> Self {
        Self { line_end, ..self }
    }

    #[must_use]
    pub const fn macro_labels(&self) -> &MacroLabels {
        &self.macro_labels
    }
    pub fn with_macro_labels(self, macro_labels: MacroLabels) -> Self {
        Self {
            macro_labels,
            ..self
        }
    }
}
