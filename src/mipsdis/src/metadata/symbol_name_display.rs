/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use crate::config::GlobalConfig;

use super::{ContextSymbol, SymbolType};

fn should_escape_symbol(name: &str) -> bool {
    name.contains('@')
}

/// Lazy renderer for a symbol's name.
///
/// User-declared names are printed verbatim (quoted when they contain
/// characters GAS would choke on). Autogenerated symbols get a canonical name
/// derived from their type and address, so the same Context always prints the
/// same listing.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct SymbolNameDisplay<'sym, 'conf> {
    sym: &'sym ContextSymbol,
    config: &'conf GlobalConfig,
}

impl<'sym, 'conf> SymbolNameDisplay<'sym, 'conf> {
    pub(crate) fn new(sym: &'sym ContextSymbol, config: &'conf GlobalConfig) -> Self {
        Self { sym, config }
    }
}

impl SymbolNameDisplay<'_, '_> {
    fn display_prefix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data_typed_names = self.config.autogenerated_names_based_on_data_type();

        match self.sym.sym_type() {
            Some(SymbolType::Function) => write!(f, "func_"),
            Some(SymbolType::BranchLabel) => write!(f, ".L"),
            Some(SymbolType::JumptableLabel) => write!(f, "L"),
            Some(SymbolType::Jumptable) => write!(f, "jtbl_"),
            Some(SymbolType::Float32) if data_typed_names => write!(f, "FLT_"),
            Some(SymbolType::Float64) if data_typed_names => write!(f, "DBL_"),
            Some(SymbolType::CString) if data_typed_names && !self.sym.failed_string_decoding() => {
                write!(f, "STR_")
            }
            _ => write!(f, "D_"),
        }
    }

    fn display_suffix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(category) = self.sym.overlay_category() {
            write!(f, "_{}", category)?;
        }

        Ok(())
    }

    pub(crate) fn autogenerate_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_prefix(f)?;
        write!(f, "{}", self.sym.vram())?;
        self.display_suffix(f)
    }
}

impl fmt::Display for SymbolNameDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user_declared_name) = self.sym.user_declared_name() {
            let should_escape = should_escape_symbol(user_declared_name);

            if should_escape {
                write!(f, "\"")?;
            }
            write!(f, "{}", user_declared_name)?;
            if should_escape {
                write!(f, "\"")?;
            }
            Ok(())
        } else {
            self.autogenerate_name(f)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use crate::{
        addresses::Vram,
        config::{Endian, GlobalConfig},
        metadata::{ContextSymbol, GeneratedBy, SymbolType},
    };

    use pretty_assertions::assert_eq;

    #[test]
    fn autogenerated_names_follow_type() {
        let config = GlobalConfig::new(Endian::Big);

        let mut sym = ContextSymbol::new(Vram::new(0x80012345), GeneratedBy::Autogenerated);
        assert_eq!(format!("{}", sym.display_name(&config)), "D_80012345");

        sym.set_type(SymbolType::Function, GeneratedBy::Autogenerated);
        assert_eq!(format!("{}", sym.display_name(&config)), "func_80012345");

        sym.set_type(SymbolType::Jumptable, GeneratedBy::Autogenerated);
        assert_eq!(format!("{}", sym.display_name(&config)), "jtbl_80012345");

        sym.set_type(SymbolType::Float32, GeneratedBy::Autogenerated);
        assert_eq!(format!("{}", sym.display_name(&config)), "FLT_80012345");
    }

    #[test]
    fn data_type_naming_can_be_turned_off() {
        let config =
            GlobalConfig::new(Endian::Big).with_autogenerated_names_based_on_data_type(false);

        let mut sym = ContextSymbol::new(Vram::new(0x80012345), GeneratedBy::Autogenerated);
        sym.set_type(SymbolType::Float64, GeneratedBy::Autogenerated);
        assert_eq!(format!("{}", sym.display_name(&config)), "D_80012345");
    }

    #[test]
    fn user_names_win() {
        let config = GlobalConfig::new(Endian::Big);

        let mut sym = ContextSymbol::new(Vram::new(0x80012345), GeneratedBy::UserDeclared);
        *sym.user_declared_name_mut() = Some("osTvType".into());
        assert_eq!(format!("{}", sym.display_name(&config)), "osTvType");
    }
}
