/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::{opcodes::Opcode, registers::Gpr, registers_meta::Register, Instruction};

use crate::addresses::Rom;

use super::{HiInfo, JrRegData, LoPairingInfo, TrackedRegisterState};

/// Per-register knowledge while walking a function linearly: which registers
/// hold the upper half of an address, a completed address, a `$gp` load, and
/// which ones a branch already looked at.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RegisterTracker {
    registers: [TrackedRegisterState; Gpr::count()],
}

impl RegisterTracker {
    pub(crate) fn new() -> Self {
        Self {
            registers: [TrackedRegisterState::new(); Gpr::count()],
        }
    }

    fn state_of(&mut self, reg: Gpr) -> &mut TrackedRegisterState {
        &mut self.registers[reg.as_index()]
    }

    pub(crate) fn clear(&mut self) {
        for state in self.registers.iter_mut() {
            state.clear();
        }
    }

    /// Nothing survives a function call in the caller-saved registers.
    pub(crate) fn clear_clobbered_by_call(&mut self, instr: &Instruction, prev_instr: &Instruction) {
        if !prev_instr.is_function_call() {
            return;
        }

        let abi = instr.abi();
        for raw in 0..Gpr::count() as u32 {
            let reg: Gpr = raw.try_into().expect("Gpr indices are always in range");
            if reg.is_clobbered_by_func_call(abi) {
                self.state_of(reg).clear();
            }
        }
    }

    /// A branch examined its operands; pairing their value later would cross
    /// a control-flow edge.
    pub(crate) fn taint_branch_operands(&mut self, instr: &Instruction, instr_rom: Rom) {
        debug_assert!(instr.get_branch_offset_generic().is_some());

        let operands = [
            (instr.field().rs(), instr.opcode().reads_rs()),
            (instr.field().rt(), instr.opcode().reads_rt()),
            (instr.field().rd(), instr.opcode().reads_rd()),
        ];
        for (reg, is_read) in operands {
            if let (Some(reg), true) = (reg, is_read) {
                self.state_of(reg).set_branching(instr_rom);
            }
        }
    }

    /// A `lui` put an upper half into `dst`.
    pub(crate) fn record_hi(&mut self, dst: Gpr, value: u32, instr_rom: Rom, on_likely_slot: bool) {
        let state = self.state_of(dst);
        state.clear();
        state.set_hi(value, instr_rom, on_likely_slot);
    }

    /// `$gp` got loaded relative to itself.
    pub(crate) fn record_gp_load(&mut self, instr: &Instruction, instr_rom: Rom) {
        debug_assert!(instr.opcode().can_be_lo());

        if let Some(dst) = instr.get_destination_gpr() {
            let state = self.state_of(dst);
            state.clear();
            state.set_gp_load(
                instr
                    .field()
                    .imm_i16()
                    .expect("a gp load carries an immediate") as i32 as u32,
                instr_rom,
            );
        }
    }

    /// A `%lo` completed; `dst` now holds a full address.
    pub(crate) fn record_lo_result(&mut self, instr: &Instruction, address: u32, instr_rom: Rom) {
        let Some(dst) = instr.get_destination_gpr() else {
            return;
        };

        let dereferences = instr.opcode().does_dereference();
        let overwrote_its_own_base = Some(dst) == instr.field().rs();

        let state = self.state_of(dst);
        state.set_lo(address, instr_rom);
        if dereferences {
            state.set_deref(instr_rom);
        }
        if overwrote_its_own_base {
            state.clear_hi();
            state.clear_gp();
        }
        state.clear_branch();
    }

    /// An `ori` completed a hi/lo constant.
    pub(crate) fn record_constant_result(&mut self, instr: &Instruction, value: u32, instr_rom: Rom) {
        if let Some(dst) = instr.get_destination_gpr() {
            self.state_of(dst).set_lo(value, instr_rom);
        }
    }

    /// Whatever this instruction writes is no longer something we tracked.
    pub(crate) fn invalidate_written_register(&mut self, instr: &Instruction, instr_rom: Rom) {
        if matches!(
            instr.opcode(),
            Opcode::core_mtc1 | Opcode::core_dmtc1 | Opcode::core_ctc1
        ) {
            // A value moved into the float coprocessor went through a gpr
            // temp which won't be read again.
            if let Some(rt) = instr.field().rt() {
                self.forget(rt, instr_rom);
            }
            return;
        }

        if let Some(dst) = instr.get_destination_gpr() {
            if instr.opcode().can_be_hi() {
                // The upper half replaces any completed address.
                self.state_of(dst).clear_lo();
            } else {
                self.forget(dst, instr_rom);
            }
        }
    }

    /// The pairing candidate for a `%lo`-capable instruction, from whatever
    /// its base register currently holds. Also simulates a dereference when
    /// the instruction loads through a completed address.
    pub(crate) fn lo_pairing_for(
        &mut self,
        instr: &Instruction,
        instr_rom: Rom,
    ) -> Option<LoPairingInfo> {
        let base = instr.field().rs()?;
        let state = self.registers[base.as_index()];

        let candidate = if let Some(hi) = state.hi_info() {
            // An upper half set on a branch-likely delay slot only exists on
            // the taken path; don't pair it here.
            (!hi.set_on_branch_likely).then_some(LoPairingInfo {
                instr_rom: hi.instr_rom,
                value: state.value() as i64,
                is_gp_rel: false,
                is_gp_got: false,
            })
        } else if base.is_global_pointer(instr.abi()) {
            Some(LoPairingInfo {
                instr_rom: Rom::new(0),
                value: state.value() as i64,
                is_gp_rel: true,
                is_gp_got: false,
            })
        } else {
            state.gp_info().map(|gp_rom| LoPairingInfo {
                instr_rom: gp_rom,
                value: state.value() as i64,
                is_gp_rel: false,
                is_gp_got: true,
            })
        };

        if candidate.is_some() {
            return candidate;
        }

        if instr.opcode().does_dereference()
            && state.lo_info().is_some()
            && state.dereferenced().is_none()
        {
            if let Some(rt) = instr.field().rt() {
                let loaded = self.state_of(rt);
                loaded.dereference_from(state, instr_rom);
                loaded.clear_branch();
            }
        }

        None
    }

    /// What the register a `jr` jumps through currently holds, when we saw
    /// it being filled.
    pub(crate) fn jump_register_info(&self, instr: &Instruction) -> Option<JrRegData> {
        let reg = instr.field().rs()?;
        let state = &self.registers[reg.as_index()];

        state
            .lo_info()
            .map(|lo_rom| JrRegData::new(lo_rom, state.value(), state.branch_info()))
    }

    /// The `lui` an `ori` would pair with, if its base register has one.
    pub(crate) fn hi_for_ori(&self, instr: &Instruction) -> Option<HiInfo> {
        let reg = instr.field().rs()?;
        self.registers[reg.as_index()].hi_info()
    }

    /// A `%lo`-shaped instruction whose base holds a completed address but no
    /// upper half: a repeated access, not a new pair.
    pub(crate) fn holds_unpaired_lo(&self, instr: &Instruction) -> bool {
        instr.field().rs().is_some_and(|reg| {
            let state = &self.registers[reg.as_index()];
            state.lo_info().is_some() && state.hi_info().is_none()
        })
    }

    fn forget(&mut self, reg: Gpr, instr_rom: Rom) {
        let state = self.state_of(reg);

        state.clear_hi();
        if !state.was_set_in_current_instr(instr_rom) {
            state.clear_gp();
            state.clear_lo();
        }
        state.clear_branch();
    }
}
