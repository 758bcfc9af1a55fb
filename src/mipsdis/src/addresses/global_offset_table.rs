/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::vec::Vec;
use core::fmt;

use super::{AddressRange, Size, Vram};

/// The `.got` tables: a PLT base pointer plus the local and global entries.
///
/// Global entries bind to a symbol of the global segment once
/// `Context::init_got_table` runs.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlobalOffsetTable {
    plt_got: Option<Vram>,
    vram: Option<AddressRange<Vram>>,
    locals: Vec<u32>,
    globals: Vec<GotGlobalEntry>,
}

impl GlobalOffsetTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            plt_got: None,
            vram: None,
            locals: Vec::new(),
            globals: Vec::new(),
        }
    }

    pub fn init_tables(&mut self, plt_got: Vram, locals: Vec<u32>, globals: Vec<u32>) {
        let count = locals.len() + globals.len();

        self.plt_got = Some(plt_got);
        self.vram = Some(AddressRange::new(
            plt_got,
            plt_got + Size::new(count as u32 * 4),
        ));
        self.locals = locals;
        self.globals = globals.into_iter().map(GotGlobalEntry::new).collect();
    }

    #[must_use]
    pub const fn plt_got(&self) -> Option<Vram> {
        self.plt_got
    }
    #[must_use]
    pub fn locals(&self) -> &[u32] {
        &self.locals
    }
    #[must_use]
    pub fn globals(&self) -> &[GotGlobalEntry] {
        &self.globals
    }

    /// The global entry whose address is exactly `address`, if any.
    #[must_use]
    pub fn got_sym_entry(&self, address: u32) -> Option<&GotGlobalEntry> {
        self.globals.iter().find(|entry| entry.address() == address)
    }

    /// Binds each global entry to the symbol created for it, in table order.
    pub(crate) fn bind_globals(&mut self, syms: &[Vram]) {
        for (entry, vram) in self.globals.iter_mut().zip(syms) {
            entry.bind_context_sym(*vram);
        }
    }

    /// Resolves a `%got` access by table index.
    #[must_use]
    pub(crate) fn request_address(&self, vram: Vram) -> Option<GotRequestedAddress> {
        let range = self.vram.as_ref()?;
        if !range.in_range(vram) {
            return None;
        }

        let diff = (vram - range.start()).inner();
        if diff < 0 {
            return None;
        }

        let index = (diff / 4) as usize;
        if let Some(x) = self.locals.get(index) {
            Some(GotRequestedAddress::Local(*x))
        } else {
            let global_index = index - self.locals.len();
            self.globals
                .get(global_index)
                .map(|x| GotRequestedAddress::Global(*x))
        }
    }
}

impl Default for GlobalOffsetTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GotGlobalEntry {
    address: u32,
    context_sym: Option<Vram>,
}

impl GotGlobalEntry {
    #[must_use]
    pub const fn new(address: u32) -> Self {
        Self {
            address,
            context_sym: None,
        }
    }

    #[must_use]
    pub const fn address(&self) -> u32 {
        self.address
    }

    /// The vram of the ContextSymbol this entry got bound to, if any.
    #[must_use]
    pub const fn context_sym(&self) -> Option<Vram> {
        self.context_sym
    }
    pub(crate) fn bind_context_sym(&mut self, vram: Vram) {
        self.context_sym = Some(vram);
    }
}

impl fmt::Debug for GotGlobalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GotGlobalEntry {{ 0x{:08X} }}", self.address)
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum GotRequestedAddress {
    Local(u32),
    Global(GotGlobalEntry),
}

impl GotRequestedAddress {
    #[must_use]
    pub const fn address(&self) -> u32 {
        match self {
            GotRequestedAddress::Local(x) => *x,
            GotRequestedAddress::Global(x) => x.address(),
        }
    }

    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, GotRequestedAddress::Local(_))
    }
}
