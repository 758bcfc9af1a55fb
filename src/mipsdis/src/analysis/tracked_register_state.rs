/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use crate::addresses::Rom;

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct HiInfo {
    pub(crate) instr_rom: Rom,
    /// Whether the `lui` sits on the delay slot of a branch likely, in which
    /// case pairing it with anything on the fallthrough path is wrong.
    pub(crate) set_on_branch_likely: bool,
}

/// Everything we know about the value a single register currently holds.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TrackedRegisterState {
    /// The raw value: upper half after a `lui`, full address after a `%lo`
    /// pairing, constant after an `ori` pairing.
    value: u32,

    hi_info: Option<HiInfo>,
    /// Set when the register got its value from a `$gp` relative load.
    gp_info: Option<Rom>,
    /// Rom of the instruction that completed the low half.
    lo_info: Option<Rom>,
    /// Rom of the instruction that dereferenced this register.
    dereferenced: Option<Rom>,
    /// Rom of the last branch which examined this register.
    branch_info: Option<Rom>,
}

impl TrackedRegisterState {
    pub(crate) const fn new() -> Self {
        Self {
            value: 0,
            hi_info: None,
            gp_info: None,
            lo_info: None,
            dereferenced: None,
            branch_info: None,
        }
    }

    pub(crate) const fn value(&self) -> u32 {
        self.value
    }
    pub(crate) const fn hi_info(&self) -> Option<HiInfo> {
        self.hi_info
    }
    pub(crate) const fn gp_info(&self) -> Option<Rom> {
        self.gp_info
    }
    pub(crate) const fn lo_info(&self) -> Option<Rom> {
        self.lo_info
    }
    pub(crate) const fn dereferenced(&self) -> Option<Rom> {
        self.dereferenced
    }
    pub(crate) const fn branch_info(&self) -> Option<Rom> {
        self.branch_info
    }
}

impl TrackedRegisterState {
    pub(crate) fn clear(&mut self) {
        self.value = 0;
        self.hi_info = None;
        self.gp_info = None;
        self.lo_info = None;
        self.dereferenced = None;
        self.branch_info = None;
    }

    pub(crate) fn clear_hi(&mut self) {
        self.hi_info = None;
    }
    pub(crate) fn clear_gp(&mut self) {
        self.gp_info = None;
    }
    pub(crate) fn clear_lo(&mut self) {
        self.lo_info = None;
        self.dereferenced = None;
    }
    pub(crate) fn clear_branch(&mut self) {
        self.branch_info = None;
    }

    pub(crate) fn set_hi(&mut self, value: u32, instr_rom: Rom, set_on_branch_likely: bool) {
        self.value = value << 16;
        self.hi_info = Some(HiInfo {
            instr_rom,
            set_on_branch_likely,
        });
        self.lo_info = None;
        self.dereferenced = None;
    }

    pub(crate) fn set_gp_load(&mut self, value: u32, instr_rom: Rom) {
        self.value = value;
        self.gp_info = Some(instr_rom);
    }

    pub(crate) fn set_lo(&mut self, value: u32, instr_rom: Rom) {
        self.value = value;
        self.lo_info = Some(instr_rom);
    }

    pub(crate) fn set_deref(&mut self, instr_rom: Rom) {
        self.dereferenced = Some(instr_rom);
    }

    pub(crate) fn set_branching(&mut self, instr_rom: Rom) {
        self.branch_info = Some(instr_rom);
    }

    pub(crate) fn dereference_from(&mut self, other: TrackedRegisterState, instr_rom: Rom) {
        *self = other;
        self.set_deref(instr_rom);
    }

    pub(crate) fn was_set_in_current_instr(&self, instr_rom: Rom) -> bool {
        self.lo_info == Some(instr_rom) || self.gp_info == Some(instr_rom)
    }
}
