/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Compiler {
    // N64
    IDO,
    GCC,
    KMC,
    SN64,

    // iQue
    EGCS,

    // PS1
    PSYQ,
}

impl Compiler {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "IDO" => Some(Compiler::IDO),
            "GCC" => Some(Compiler::GCC),
            "KMC" => Some(Compiler::KMC),
            "SN64" => Some(Compiler::SN64),
            "EGCS" => Some(Compiler::EGCS),
            "PSYQ" => Some(Compiler::PSYQ),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Compiler::IDO => "IDO",
            Compiler::GCC => "GCC",
            Compiler::KMC => "KMC",
            Compiler::SN64 => "SN64",
            Compiler::EGCS => "EGCS",
            Compiler::PSYQ => "PSYQ",
        }
    }

    // TODO: Specifying 3 unconditionally should be harmless. Need to investigate.
    pub(crate) const fn prev_align_for_double(&self) -> Option<u8> {
        match self {
            Compiler::SN64 => Some(3),
            Compiler::PSYQ => Some(3),
            _ => None,
        }
    }

    /// The alignment directive emitted after a string, as `(directive, value)`.
    pub(crate) const fn post_align_for_string(&self) -> (&'static str, u8) {
        match self {
            Compiler::SN64 | Compiler::PSYQ => (".align", 2),
            _ => (".balign", 4),
        }
    }
}
