/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_set::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use rabbitizer::{Instruction, InstructionFlags, Vram};

use crate::{
    addresses::{AddressRange, Rom, RomVramRange, Size},
    collections::FindSettings,
    context::{Context, OwnedSegmentNotFoundError},
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
    symbols::{
        display::{FunctionDisplaySettings, SymDisplayError},
        Symbol, SymbolFunction,
    },
};

use super::Section;

#[derive(Debug, Clone)]
pub struct TextSectionSettings {
    instruction_flags: InstructionFlags,
}

impl TextSectionSettings {
    pub fn new(instruction_flags: InstructionFlags) -> Self {
        Self { instruction_flags }
    }

    #[must_use]
    pub fn instruction_flags(&self) -> InstructionFlags {
        self.instruction_flags
    }
}

/// An executable section: finds function boundaries and runs the instruction
/// analysis over each one.
pub struct TextSection {
    name: String,

    ranges: RomVramRange,
    raw_bytes: Vec<u8>,
    settings: TextSectionSettings,

    parent_segment_info: ParentSegmentInfo,

    functions: Vec<SymbolFunction>,

    symbol_vrams: BTreeSet<Vram>,
}

impl TextSection {
    pub fn new(
        settings: TextSectionSettings,
        name: String,
        raw_bytes: Vec<u8>,
        rom: Rom,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
    ) -> Self {
        assert!(
            !raw_bytes.is_empty(),
            "Can't initialize a section with empty bytes. {:?} {:?}",
            rom,
            vram
        );
        assert!(
            vram.inner() % 4 == 0,
            "Vram address must be aligned to 4 bytes"
        );
        assert!(
            rom.inner() % 4 == 0,
            "Rom address must be aligned to 4 bytes"
        );

        // The last partial word, if any, can't be an instruction.
        let size = Size::new((raw_bytes.len() as u32) & !3);
        let rom_range = AddressRange::new(rom, rom + size);
        let vram_range = AddressRange::new(vram, vram + size);
        let ranges = RomVramRange::new(rom_range, vram_range);

        Self {
            name,
            ranges,
            raw_bytes,
            settings,
            parent_segment_info,
            functions: Vec::new(),
            symbol_vrams: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn functions(&self) -> &[SymbolFunction] {
        &self.functions
    }

    fn vram_at(&self, instr_index: usize) -> Vram {
        self.ranges.vram().start() + Size::new(instr_index as u32 * 4)
    }

    pub fn analyze(&mut self, context: &mut Context) -> Result<(), OwnedSegmentNotFoundError> {
        self.functions.clear();
        self.symbol_vrams.clear();

        let endian = context.global_config().endian();
        let vram = self.ranges.vram().start();
        let rom = self.ranges.rom().start();

        let mut raw_words = Vec::new();
        let mut instrs = Vec::new();
        for (i, word_bytes) in self.raw_bytes.chunks_exact(4).enumerate() {
            let word = endian.word_from_bytes(word_bytes);
            raw_words.push(word);
            instrs.push(Instruction::new(
                word,
                vram + Size::new(i as u32 * 4),
                self.settings.instruction_flags(),
            ));
        }

        if instrs.is_empty() {
            return Ok(());
        }

        let starts = self.find_functions(context, &instrs)?;

        for (i, start) in starts.iter().enumerate() {
            let end = if i + 1 < starts.len() {
                starts[i + 1]
            } else {
                instrs.len()
            };
            debug_assert!(*start < end, "{:?} {} {} {}", rom, vram, start, end);

            let func_vram = self.vram_at(*start);
            let func_rom = rom + Size::new(*start as u32 * 4);

            self.symbol_vrams.insert(func_vram);

            let func = SymbolFunction::new(
                context,
                instrs[*start..end].into(),
                raw_words[*start..end].into(),
                func_rom,
                func_vram,
                self.parent_segment_info.clone(),
            )?;

            self.functions.push(func);
        }

        Ok(())
    }

    /// Walks the instructions deciding where each function starts.
    ///
    /// A function ends on its user-declared size when it has one, right
    /// before a trusted function symbol, or at a `jr $ra` (or tail jump)
    /// which no earlier branch jumps over.
    fn find_functions(
        &self,
        context: &Context,
        instrs: &[Instruction],
    ) -> Result<Vec<usize>, OwnedSegmentNotFoundError> {
        let trust_user_functions = context.global_config().trust_user_functions();
        let j_as_branch = self.settings.instruction_flags().j_as_branch();
        let owned_segment = context.find_owned_segment(&self.parent_segment_info)?;
        let find_exact = FindSettings::new().with_allow_addend(false);

        let mut starts = Vec::new();
        let mut index = 0;
        let mut prev_start = 0;

        // Leading nop padding gets split into its own chunk.
        if instrs[0].is_nop() {
            while index < instrs.len()
                && instrs[index].is_nop()
                && owned_segment.get_symbol(self.vram_at(index), find_exact).is_none()
            {
                index += 1;
            }
            if index != 0 && index < instrs.len() {
                starts.push(prev_start);
                prev_start = index;
            }
        }

        let user_size_at = |instr_index: usize| {
            owned_segment
                .get_symbol(self.vram_at(instr_index), find_exact)
                .and_then(|sym| sym.user_declared_size())
        };

        let mut current_function_start = prev_start;
        let mut current_function_user_size = user_size_at(prev_start);
        let mut farthest_branch: i32 = 0;

        while index < instrs.len() {
            let instr = &instrs[index];
            let mut function_ended = false;

            if let Some(branch_offset) = instr.get_branch_offset_generic() {
                if branch_offset.inner() > farthest_branch {
                    // Keep track of the farthest branch target
                    farthest_branch = branch_offset.inner();
                }
            }

            if let Some(user_size) = current_function_user_size {
                // A user-declared size beats every other way of determining
                // where the function ends.
                if (index + 2 - current_function_start) * 4 == user_size.inner() as usize {
                    function_ended = true;
                }
            } else {
                if let Some(sym) = owned_segment.get_symbol(self.vram_at(index + 2), find_exact) {
                    // If there's another function after this one then the
                    // current function has ended
                    if sym.is_trustable_function(trust_user_functions) {
                        function_ended = true;
                    }
                }

                if !function_ended && farthest_branch <= 0 && instr.opcode().is_jump() {
                    if instr.is_return() {
                        // Found a jr $ra and there are no branches outside of
                        // this function
                        function_ended = true;
                    } else if instr.is_jumptable_jump() {
                        // Usually jumptables, ignore
                    } else if instr.opcode().does_link() {
                        // Just a function call, nothing to see here
                    } else if instr.opcode().is_jump_with_address() && !j_as_branch {
                        // Tail call
                        function_ended = true;
                    }
                }
            }

            index += 1;
            farthest_branch -= 4;

            if function_ended {
                // Include the delay slot
                if index < instrs.len() {
                    index += 1;
                }
                // Skip the padding between functions
                while index < instrs.len()
                    && instrs[index].is_nop()
                    && owned_segment.get_symbol(self.vram_at(index), find_exact).is_none()
                {
                    index += 1;
                }

                starts.push(prev_start);
                prev_start = index;
                current_function_start = index;
                current_function_user_size = if index < instrs.len() {
                    user_size_at(index)
                } else {
                    None
                };
                farthest_branch = 0;
            }
        }

        if prev_start != index {
            starts.push(prev_start);
        }

        Ok(starts)
    }

    pub fn disassemble(
        &self,
        context: &Context,
        settings: &FunctionDisplaySettings,
    ) -> Result<String, SymDisplayError> {
        use core::fmt::Write;

        let mut output = String::new();
        for (i, func) in self.functions.iter().enumerate() {
            if i != 0 {
                output.push_str(context.global_config().line_end());
            }
            let _ = write!(output, "{}", func.display(context, settings)?);
        }
        Ok(output)
    }
}

impl Section for TextSection {
    fn name(&self) -> &str {
        &self.name
    }

    fn vram_range(&self) -> &AddressRange<Vram> {
        self.ranges.vram()
    }

    fn parent_segment_info(&self) -> &ParentSegmentInfo {
        &self.parent_segment_info
    }

    #[must_use]
    fn section_type(&self) -> SectionType {
        SectionType::Text
    }

    fn symbol_list(&self) -> &[impl Symbol] {
        &self.functions
    }

    fn symbols_vrams(&self) -> &BTreeSet<Vram> {
        &self.symbol_vrams
    }
}
