/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::{btree_map::BTreeMap, btree_set::BTreeSet};
use rabbitizer::{registers::Gpr, registers_meta::Register, vram::VramOffset, Instruction, Vram};

use crate::{
    addresses::{Rom, RomVramRange},
    context::{Context, SymbolsSegment},
};

use super::RegisterTracker;

/// Everything a linear walk over a function's instructions discovers:
/// branch targets, call targets, paired hi/lo addresses, constants and
/// jumptable references, all keyed by the rom of the instruction which
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionAnalysisResult {
    ranges: RomVramRange,

    /// Every referenced vram found.
    referenced_vrams: BTreeSet<Vram>,

    /// Key is the rom of the branch instruction, value is the vram target.
    branch_targets: BTreeMap<Rom, Vram>,
    /// Branches which jump outside the current function.
    branch_targets_outside: BTreeMap<Rom, Vram>,

    /// Key is the rom of the `jal`/`j`, value is the address of the callee.
    func_calls: BTreeMap<Rom, Vram>,

    /// Key is the rom of the `%lo` which loaded the jumptable's address.
    referenced_jumptables: BTreeMap<Rom, Vram>,

    hi_instrs: BTreeMap<Rom, (Gpr, u16)>,
    non_lo_instrs: BTreeSet<Rom>,

    constant_per_instr: BTreeMap<Rom, u32>,

    address_per_hi_instr: BTreeMap<Rom, Vram>,
    address_per_lo_instr: BTreeMap<Rom, Vram>,
    /// `%lo` instructions which paired through `$gp` instead of a `lui`.
    gp_rel_lo_instrs: BTreeSet<Rom>,
    /// `%lo` instructions whose reconstructed target came from a lo patch.
    patched_lo_instrs: BTreeSet<Rom>,
}

impl InstructionAnalysisResult {
    #[must_use]
    pub(crate) fn new(ranges: RomVramRange) -> Self {
        Self {
            ranges,
            referenced_vrams: BTreeSet::new(),
            branch_targets: BTreeMap::new(),
            branch_targets_outside: BTreeMap::new(),
            func_calls: BTreeMap::new(),
            referenced_jumptables: BTreeMap::new(),
            hi_instrs: BTreeMap::new(),
            non_lo_instrs: BTreeSet::new(),
            constant_per_instr: BTreeMap::new(),
            address_per_hi_instr: BTreeMap::new(),
            address_per_lo_instr: BTreeMap::new(),
            gp_rel_lo_instrs: BTreeSet::new(),
            patched_lo_instrs: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn referenced_vrams(&self) -> &BTreeSet<Vram> {
        &self.referenced_vrams
    }

    #[must_use]
    pub fn branch_targets(&self) -> &BTreeMap<Rom, Vram> {
        &self.branch_targets
    }

    #[must_use]
    pub fn branch_targets_outside(&self) -> &BTreeMap<Rom, Vram> {
        &self.branch_targets_outside
    }

    #[must_use]
    pub fn func_calls(&self) -> &BTreeMap<Rom, Vram> {
        &self.func_calls
    }

    #[must_use]
    pub fn referenced_jumptables(&self) -> &BTreeMap<Rom, Vram> {
        &self.referenced_jumptables
    }

    #[must_use]
    pub fn hi_instrs(&self) -> &BTreeMap<Rom, (Gpr, u16)> {
        &self.hi_instrs
    }

    #[must_use]
    pub fn constant_per_instr(&self) -> &BTreeMap<Rom, u32> {
        &self.constant_per_instr
    }

    #[must_use]
    pub fn address_per_hi_instr(&self) -> &BTreeMap<Rom, Vram> {
        &self.address_per_hi_instr
    }
    #[must_use]
    pub fn address_per_lo_instr(&self) -> &BTreeMap<Rom, Vram> {
        &self.address_per_lo_instr
    }

    #[must_use]
    pub fn is_lo_instr_gp_rel(&self, instr_rom: Rom) -> bool {
        self.gp_rel_lo_instrs.contains(&instr_rom)
    }

    /// `%lo` instructions whose target came from a user lo patch instead of
    /// the pairing algorithm.
    #[must_use]
    pub fn patched_lo_instrs(&self) -> &BTreeSet<Rom> {
        &self.patched_lo_instrs
    }
}

impl InstructionAnalysisResult {
    pub(crate) fn process_prev_func_call(
        &mut self,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        prev_instr: &Instruction,
    ) {
        regs_tracker.clear_clobbered_by_call(instr, prev_instr);
    }

    pub(crate) fn process_instr(
        &mut self,
        context: &Context,
        owned_segment: &SymbolsSegment,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        prev_instr: Option<&Instruction>,
    ) {
        if let Some(target_vram) = instr.get_branch_vram_generic() {
            // instr.opcode().is_branch() or instr.is_unconditional_branch()
            self.process_branch(regs_tracker, instr, target_vram);
        } else if let Some(target_vram) = instr.get_instr_index_as_vram() {
            // instr.opcode().is_jump_with_address()
            self.process_func_call(instr, target_vram);
        } else if instr.is_jumptable_jump() {
            self.process_jumptable_jump(regs_tracker, instr);
        } else if instr.opcode().can_be_hi() {
            self.process_hi(regs_tracker, instr, prev_instr);
        } else if instr.opcode().can_be_unsigned_lo() {
            self.process_unsigned_lo(regs_tracker, instr);
        } else if instr.opcode().can_be_lo() {
            self.process_signed_lo(context, owned_segment, regs_tracker, instr);
        }

        regs_tracker.invalidate_written_register(instr, self.rom_from_instr(instr));
    }
}

impl InstructionAnalysisResult {
    fn process_branch(
        &mut self,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        target_vram: Vram,
    ) {
        let instr_rom = self.rom_from_instr(instr);

        if !self.ranges.in_vram_range(target_vram) {
            self.branch_targets_outside.insert(instr_rom, target_vram);
            return;
        }

        regs_tracker.taint_branch_operands(instr, instr_rom);

        self.add_referenced_vram(target_vram);
        self.branch_targets.insert(instr_rom, target_vram);
    }

    fn process_func_call(&mut self, instr: &Instruction, target_vram: Vram) {
        let instr_rom = self.rom_from_instr(instr);
        self.add_referenced_vram(target_vram);
        self.func_calls.insert(instr_rom, target_vram);
    }

    fn process_jumptable_jump(&mut self, regs_tracker: &mut RegisterTracker, instr: &Instruction) {
        if let Some(jr_reg_data) = regs_tracker.jump_register_info(instr) {
            let lo_rom = jr_reg_data.lo_rom();
            let address = Vram::new(jr_reg_data.address());

            if jr_reg_data.branch_info().is_some() {
                // Jumptables never check the register they are branching into,
                // since the references should always be valid. This kind of
                // check usually is performed on tail call optimizations when a
                // function pointer is involved.
            } else {
                self.referenced_jumptables.insert(lo_rom, address);
            }

            self.add_referenced_vram(address);
        }
    }

    fn process_hi(
        &mut self,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        prev_instr: Option<&Instruction>,
    ) {
        let instr_rom = self.rom_from_instr(instr);
        let dst = instr
            .get_destination_gpr()
            .expect("lui should have dst register");
        let upper = instr
            .field()
            .imm_u16()
            .expect("lui should have an immediate field");
        // An upper half placed on a branch-likely delay slot only exists on
        // the taken path.
        let on_likely_slot = prev_instr.is_some_and(|prev| {
            prev.opcode().is_branch_likely() || prev.is_unconditional_branch()
        });

        regs_tracker.record_hi(dst, upper as u32, instr_rom, on_likely_slot);
        self.hi_instrs.insert(instr_rom, (dst, upper));
    }

    fn process_unsigned_lo(&mut self, regs_tracker: &mut RegisterTracker, instr: &Instruction) {
        // Pairing with an `ori`, so we treat this as a constant.
        if let Some(hi_info) = regs_tracker.hi_for_ori(instr) {
            if let Some((_hi_reg, hi_imm)) = self.hi_instrs.get(&hi_info.instr_rom) {
                let instr_rom = self.rom_from_instr(instr);
                let upper = *hi_imm as u32;
                let lower = instr
                    .field()
                    .imm_u16()
                    .expect("ori should have an immediate field") as u32;
                let constant = (upper << 16) | lower;

                self.constant_per_instr.insert(hi_info.instr_rom, constant);
                self.constant_per_instr.insert(instr_rom, constant);

                regs_tracker.record_constant_result(instr, constant, instr_rom);
            }
        }
    }

    fn process_signed_lo(
        &mut self,
        context: &Context,
        owned_segment: &SymbolsSegment,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
    ) {
        let instr_rom = self.rom_from_instr(instr);

        if instr.opcode().does_load()
            && instr
                .get_destination_gpr()
                .is_some_and(|reg| reg.is_global_pointer(instr.abi()))
        {
            regs_tracker.record_gp_load(instr, instr_rom);
        }

        if self.non_lo_instrs.contains(&instr_rom) {
            // Already decided this one isn't the lower half of a pair.
            return;
        }

        let pairing_info = match regs_tracker.lo_pairing_for(instr, instr_rom) {
            Some(x) => x,
            None => {
                if regs_tracker.holds_unpaired_lo(instr) {
                    self.non_lo_instrs.insert(instr_rom);
                }
                return;
            }
        };

        if pairing_info.is_gp_got && !context.global_config().pic() {
            return;
        }

        let upper_info = if pairing_info.is_gp_rel {
            None
        } else {
            Some((pairing_info.value, pairing_info.instr_rom))
        };

        if let Some((_upper_half, hi_rom)) = &upper_info {
            if let Some((hi_reg, _hi_imm)) = self.hi_instrs.get(hi_rom) {
                if hi_reg.is_global_pointer(instr.abi())
                    && instr
                        .field().rs()
                        .is_some_and(|rs| instr.opcode().reads_rs() && rs.is_global_pointer(instr.abi()))
                    && instr
                        .field().rt()
                        .is_some_and(|rt| instr.opcode().modifies_rt() && rt.is_global_pointer(instr.abi()))
                {
                    // A `$gp` initialization sequence (cpload), not a symbol.
                    return;
                }
            }
        }

        let address = match self.pair_hi_lo(context, upper_info.as_ref(), instr) {
            Some(x) => x,
            None => return,
        };

        // The caller may override a specific %lo reconstruction.
        let address = if let Some(patched) = owned_segment.get_lo_patch(instr.vram()) {
            self.patched_lo_instrs.insert(instr_rom);
            patched
        } else {
            address
        };

        if upper_info.is_none() && context.global_config().pic() {
            self.process_got_symbol(context, address, instr_rom);
            return;
        }

        if self.process_address(address, upper_info.as_ref(), instr_rom) {
            if upper_info.is_none() {
                self.gp_rel_lo_instrs.insert(instr_rom);
            }
            regs_tracker.record_lo_result(instr, address.inner(), instr_rom);
        }
    }
}

impl InstructionAnalysisResult {
    fn pair_hi_lo(
        &mut self,
        context: &Context,
        upper_info: Option<&(i64, Rom)>,
        instr: &Instruction,
    ) -> Option<Vram> {
        // `upper_info` being `None` means this symbol is a $gp access.

        let lower_half = VramOffset::new(instr.field().imm_i16()? as i32);

        if let Some((upper_half, _hi_rom)) = upper_info {
            if *upper_half < 0
                || (lower_half.is_negative()
                    && lower_half.inner().unsigned_abs() > *upper_half as u32)
            {
                None
            } else {
                Some(Vram::new(*upper_half as u32) + lower_half)
            }
        } else if let Some(gp_value) = context.global_config().gp_config().map(|x| x.gp_value()) {
            if lower_half.is_negative() && lower_half.inner().unsigned_abs() > gp_value.inner() {
                None
            } else {
                Some(gp_value.add_offset(lower_half))
            }
        } else {
            None
        }
    }

    /// A `$gp` relative load under PIC points into the got table; the actual
    /// symbol is whatever the table entry holds.
    fn process_got_symbol(&mut self, context: &Context, address: Vram, instr_rom: Rom) {
        let address = match context.got().request_address(address) {
            Some(requested) => Vram::new(requested.address()),
            None => address,
        };

        self.add_referenced_vram(address);
        self.address_per_lo_instr.insert(instr_rom, address);
        self.gp_rel_lo_instrs.insert(instr_rom);
    }

    fn process_address(
        &mut self,
        address: Vram,
        upper_info: Option<&(i64, Rom)>,
        instr_rom: Rom,
    ) -> bool {
        self.add_referenced_vram(address);

        self.address_per_lo_instr.insert(instr_rom, address);
        if let Some((_upper_half, hi_rom)) = upper_info {
            if self.address_per_hi_instr.insert(*hi_rom, address).is_none() {
                self.add_referenced_vram(address);
            }
        }

        true
    }
}

impl InstructionAnalysisResult {
    fn rom_from_instr(&self, instr: &Instruction) -> Rom {
        self.ranges
            .rom_from_vram(instr.vram())
            .expect("This should not panic")
    }

    fn add_referenced_vram(&mut self, referenced_vram: Vram) {
        self.referenced_vrams.insert(referenced_vram);
    }
}
