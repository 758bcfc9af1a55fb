/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;

/// What a symbol's contents are.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum SymbolType {
    Function,
    BranchLabel,
    Jumptable,
    JumptableLabel,
    HardwareReg,
    Constant,

    Byte,
    Short,
    Word,
    Float32,
    Float64,
    CString,

    /// A type string provided by the user which the disassembler doesn't
    /// interpret, like `u32` or a struct name.
    UserCustom(String),
}

impl SymbolType {
    pub fn valid_branch_target(&self) -> bool {
        matches!(
            self,
            SymbolType::Function | SymbolType::BranchLabel | SymbolType::JumptableLabel
        )
    }

    pub fn can_reference_symbols(&self) -> bool {
        match self {
            SymbolType::Function | SymbolType::BranchLabel | SymbolType::JumptableLabel => false,
            SymbolType::Jumptable => true,
            SymbolType::HardwareReg | SymbolType::Constant => false,
            SymbolType::Byte | SymbolType::Short => false,
            SymbolType::Word => true,
            SymbolType::Float32 | SymbolType::Float64 | SymbolType::CString => false,
            SymbolType::UserCustom(_) => true,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, SymbolType::BranchLabel | SymbolType::JumptableLabel)
    }

    /// Parses a special type tag the way the variables csv spells them.
    /// Anything else is the user's own type string.
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "" => None,
            "function" => Some(SymbolType::Function),
            "branchlabel" => Some(SymbolType::BranchLabel),
            "jumptable" => Some(SymbolType::Jumptable),
            "jumptablelabel" => Some(SymbolType::JumptableLabel),
            "hardwarereg" => Some(SymbolType::HardwareReg),
            "constant" => Some(SymbolType::Constant),
            "byte" => Some(SymbolType::Byte),
            "short" => Some(SymbolType::Short),
            "word" => Some(SymbolType::Word),
            "float32" => Some(SymbolType::Float32),
            "float64" => Some(SymbolType::Float64),
            "cstring" => Some(SymbolType::CString),
            other => Some(SymbolType::UserCustom(other.into())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SymbolType::Function => "function",
            SymbolType::BranchLabel => "branchlabel",
            SymbolType::Jumptable => "jumptable",
            SymbolType::JumptableLabel => "jumptablelabel",
            SymbolType::HardwareReg => "hardwarereg",
            SymbolType::Constant => "constant",
            SymbolType::Byte => "byte",
            SymbolType::Short => "short",
            SymbolType::Word => "word",
            SymbolType::Float32 => "float32",
            SymbolType::Float64 => "float64",
            SymbolType::CString => "cstring",
            SymbolType::UserCustom(other) => other,
        }
    }

    /// The inference lattice as a total function: given the current
    /// autodetected type, decide whether `candidate` replaces it.
    ///
    /// Labels upgrade (`JumptableLabel` beats `Function` beats `BranchLabel`,
    /// and `Function` sticks once set); everything else is first-wins.
    pub(crate) fn upgrade(current: Option<&SymbolType>, candidate: &SymbolType) -> bool {
        let current = match current {
            None => return true,
            Some(x) => x,
        };

        match candidate {
            SymbolType::JumptableLabel => !matches!(current, SymbolType::JumptableLabel),
            SymbolType::Function => {
                !matches!(current, SymbolType::JumptableLabel | SymbolType::Function)
            }
            SymbolType::Jumptable => {
                !matches!(current, SymbolType::JumptableLabel | SymbolType::Function)
            }
            SymbolType::BranchLabel => !matches!(
                current,
                SymbolType::JumptableLabel | SymbolType::Function | SymbolType::BranchLabel
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_sticks() {
        assert!(!SymbolType::upgrade(
            Some(&SymbolType::Function),
            &SymbolType::BranchLabel
        ));
        assert!(!SymbolType::upgrade(
            Some(&SymbolType::Function),
            &SymbolType::Function
        ));
        assert!(!SymbolType::upgrade(
            Some(&SymbolType::Function),
            &SymbolType::Jumptable
        ));
    }

    #[test]
    fn jumptable_label_beats_function() {
        assert!(SymbolType::upgrade(
            Some(&SymbolType::Function),
            &SymbolType::JumptableLabel
        ));
        assert!(!SymbolType::upgrade(
            Some(&SymbolType::JumptableLabel),
            &SymbolType::Function
        ));
    }

    #[test]
    fn branch_label_upgrades_to_function() {
        assert!(SymbolType::upgrade(
            Some(&SymbolType::BranchLabel),
            &SymbolType::Function
        ));
    }

    #[test]
    fn data_types_are_first_wins() {
        assert!(SymbolType::upgrade(None, &SymbolType::Float32));
        assert!(!SymbolType::upgrade(
            Some(&SymbolType::Word),
            &SymbolType::Float32
        ));
    }

    #[test]
    fn user_strings_survive_round_trip() {
        let t = SymbolType::from_str("u32").unwrap();
        assert_eq!(t, SymbolType::UserCustom("u32".into()));
        assert_eq!(SymbolType::from_str(t.as_str()).unwrap(), t);
    }
}
