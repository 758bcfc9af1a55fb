/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_set::BTreeSet;
use rabbitizer::Instruction;

use crate::{
    addresses::RomVramRange,
    context::{Context, SymbolsSegment},
};

use super::{InstructionAnalysisResult, RegisterTracker};

/// Walks a function's instructions and feeds them to the per-instruction
/// analysis.
///
/// The walk is linear, but hi/lo pairs may be split across a branch, so on
/// top of the linear pass every taken branch gets re-walked with a forked
/// copy of the register state. Each branch is walked at most once.
#[derive(Debug)]
pub struct InstructionAnalyzer {
    walked_branches: BTreeSet<usize>,
}

impl InstructionAnalyzer {
    #[must_use]
    pub(crate) fn analyze(
        context: &Context,
        owned_segment: &SymbolsSegment,
        ranges: RomVramRange,
        instrs: &[Instruction],
    ) -> InstructionAnalysisResult {
        assert!(
            !instrs.is_empty(),
            "Empty instruction list?. {:?}",
            ranges.vram().start(),
        );

        let mut walker = Self {
            walked_branches: BTreeSet::new(),
        };
        let mut result = InstructionAnalysisResult::new(ranges);
        let mut regs = RegisterTracker::new();

        result.process_instr(context, owned_segment, &mut regs, &instrs[0], None);

        for idx in 1..instrs.len() {
            let instr = instrs[idx];
            let prev = instrs[idx - 1];

            if !instr.is_valid() {
                continue;
            }

            // An instruction on a branch-likely delay slot only runs on the
            // taken path; the branch walk below covers it.
            if !prev.opcode().is_branch_likely() {
                result.process_instr(context, owned_segment, &mut regs, &instr, Some(&prev));
            }

            walker.walk_taken_branch(context, owned_segment, &mut result, &regs, instrs, idx);

            if tail_jumps_out_of(&prev, &ranges) {
                // Whatever the registers held is meaningless after a tail
                // call; the rest of the function is unrelated code.
                regs.clear();
            }

            result.process_prev_func_call(&mut regs, &instr, &prev);
        }

        result
    }

    /// Re-runs the analysis along the taken side of the branch sitting right
    /// before `delay_idx`, on a fork of the register state. Recurses into
    /// further branches found along the way.
    #[allow(clippy::too_many_arguments)]
    fn walk_taken_branch(
        &mut self,
        context: &Context,
        owned_segment: &SymbolsSegment,
        result: &mut InstructionAnalysisResult,
        entry_regs: &RegisterTracker,
        instrs: &[Instruction],
        delay_idx: usize,
    ) {
        let branch = instrs[delay_idx - 1];
        let step = match branch.get_branch_offset_generic() {
            Some(offset) => offset.inner() / 4,
            None => return,
        };

        if !self.walked_branches.insert(delay_idx) {
            // This branch was already walked through some other path.
            return;
        }

        let landing = delay_idx as i32 - 1 + step;
        if landing <= 0 {
            // Branching to (or before) the function's first instruction
            // can't be a loop worth re-walking.
            return;
        }

        // Fork the register state; the fallthrough path keeps the original.
        let mut regs = *entry_regs;

        // Only branch-likely paths carry state the linear pass didn't
        // already see, starting with their delay slot.
        let walk_is_live = branch.opcode().is_branch_likely();
        if walk_is_live {
            result.process_instr(
                context,
                owned_segment,
                &mut regs,
                &instrs[delay_idx],
                Some(&branch),
            );
        }

        let mut cursor = landing as usize;
        while cursor < instrs.len() {
            let step_prev = instrs[cursor - 1];
            let step_instr = instrs[cursor];

            if walk_is_live {
                result.process_instr(
                    context,
                    owned_segment,
                    &mut regs,
                    &step_instr,
                    Some(&step_prev),
                );
            }
            self.walk_taken_branch(context, owned_segment, result, &regs, instrs, cursor);

            if step_prev.is_unconditional_branch() {
                // The walk continued through the recursion above; this path
                // never falls through.
                return;
            }
            if step_prev.opcode().is_jump() && !step_prev.opcode().does_link() {
                // A plain jump doesn't come back either.
                return;
            }

            result.process_prev_func_call(&mut regs, &step_instr, &step_prev);

            cursor += 1;
        }
    }
}

/// A non-linking jump which leaves the function entirely, i.e. a tail call.
fn tail_jumps_out_of(instr: &Instruction, ranges: &RomVramRange) -> bool {
    if !instr.opcode().is_jump_with_address() || instr.opcode().does_link() {
        return false;
    }

    instr
        .get_branch_vram_generic()
        .is_some_and(|target| !ranges.in_vram_range(target))
}
