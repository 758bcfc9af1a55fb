/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use rabbitizer::Instruction;

use crate::{
    addresses::{AddressRange, Rom, RomVramRange, Size, Vram},
    analysis::{InstructionAnalysisResult, InstructionAnalyzer},
    context::{Context, OwnedSegmentNotFoundError},
    metadata::{GeneratedBy, SymbolIndex},
    parent_segment_info::ParentSegmentInfo,
    relocation::{RelocReferencedSym, RelocationInfo, RelocationType},
    section_type::SectionType,
    symbols::{RomSymbol, Symbol},
};

use super::display::{FunctionDisplay, FunctionDisplaySettings, SymDisplayError};

/// A function: its decoded instructions plus everything the instruction
/// analysis discovered about them.
pub struct SymbolFunction {
    ranges: RomVramRange,
    instructions: Vec<Instruction>,
    raw_words: Vec<u32>,
    parent_segment_info: ParentSegmentInfo,

    instr_analysis: InstructionAnalysisResult,
    relocs: Vec<Option<RelocationInfo>>,
}

impl SymbolFunction {
    pub(crate) fn new(
        context: &mut Context,
        instructions: Vec<Instruction>,
        raw_words: Vec<u32>,
        rom: Rom,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
    ) -> Result<Self, OwnedSegmentNotFoundError> {
        let size = Size::new(instructions.len() as u32 * 4);
        let rom_range = AddressRange::new(rom, rom + size);
        let vram_range = AddressRange::new(vram, vram + size);
        let ranges = RomVramRange::new(rom_range, vram_range);

        let mut relocs = vec![None; instructions.len()];

        let ignore_branches = context.global_config().ignore_branches();
        let pic = context.global_config().pic();

        let instr_analysis = {
            let owned_segment = context.find_owned_segment(&parent_segment_info)?;
            InstructionAnalyzer::analyze(context, owned_segment, ranges, &instructions)
        };

        let self_index = SymbolIndex::new(parent_segment_info.clone(), vram);

        {
            let owned_segment = context.find_owned_segment_mut(&parent_segment_info)?;
            let metadata = owned_segment.add_function(vram, Some(rom), GeneratedBy::Autogenerated);
            *metadata.autodetected_size_mut() = Some(size);
            metadata.set_defined();
        }

        // Constants first, so an address reconstructed from the same
        // instruction wins over the constant interpretation.
        for (instr_rom, constant) in instr_analysis.constant_per_instr() {
            let reloc_type = if instr_analysis.hi_instrs().contains_key(instr_rom) {
                RelocationType::R_CUSTOM_CONSTANT_HI
            } else {
                RelocationType::R_CUSTOM_CONSTANT_LO
            };
            let index = ((*instr_rom - rom).inner() / 4) as usize;
            relocs[index] = Some(
                reloc_type.new_reloc_info(RelocReferencedSym::SymName(format!("0x{:X}", constant))),
            );
        }

        if !ignore_branches {
            for (instr_rom, target_vram) in instr_analysis
                .branch_targets()
                .iter()
                .chain(instr_analysis.branch_targets_outside())
            {
                let owned_segment = context.find_owned_segment_mut(&parent_segment_info)?;
                let branch_sym = owned_segment.add_branch_label(
                    *target_vram,
                    ranges.rom_from_vram(*target_vram),
                    GeneratedBy::Autogenerated,
                );
                branch_sym.add_reference_function(self_index.clone());

                let valid_target = branch_sym
                    .sym_type()
                    .is_some_and(|typ| typ.valid_branch_target());
                if valid_target {
                    let index = ((*instr_rom - rom).inner() / 4) as usize;
                    relocs[index] = Some(
                        RelocationType::R_MIPS_PC16
                            .new_reloc_info(RelocReferencedSym::Address(*target_vram)),
                    );
                }
            }
        }

        for (_instr_rom, target_vram) in instr_analysis.referenced_jumptables() {
            if context.is_address_banned(*target_vram) {
                continue;
            }
            let segment = context.find_referenced_segment_mut(*target_vram, &parent_segment_info);
            let jumptable =
                segment.add_jumptable(*target_vram, None, GeneratedBy::Autogenerated);
            jumptable.add_reference_function(self_index.clone());
        }

        for (instr_rom, target_vram) in instr_analysis.func_calls() {
            if context.is_address_banned(*target_vram) {
                continue;
            }

            let segment = context.find_referenced_segment_mut(*target_vram, &parent_segment_info);
            let func_sym = segment.add_function(*target_vram, None, GeneratedBy::Autogenerated);
            func_sym.add_reference_function(self_index.clone());

            let index = ((*instr_rom - rom).inner() / 4) as usize;
            relocs[index] = Some(
                RelocationType::R_MIPS_26.new_reloc_info(RelocReferencedSym::Address(*target_vram)),
            );
        }

        for (instr_rom, symbol_vram) in instr_analysis.address_per_lo_instr() {
            if context.is_address_banned(*symbol_vram) {
                continue;
            }

            let segment = context.find_referenced_segment_mut(*symbol_vram, &parent_segment_info);
            let sym_metadata =
                segment.add_symbol(*symbol_vram, None, GeneratedBy::Autogenerated, None, true);
            sym_metadata.add_reference_function(self_index.clone());
            let targets_code = sym_metadata.section_type() == Some(SectionType::Text);

            if !targets_code {
                // Let the data and bss analyzers know about this address.
                let owned_segment = context.find_owned_segment_mut(&parent_segment_info)?;
                owned_segment.add_pointer_in_data_reference(*symbol_vram);
            }

            let reloc_type = if instr_analysis.is_lo_instr_gp_rel(*instr_rom) {
                if pic {
                    RelocationType::R_MIPS_GOT16
                } else {
                    RelocationType::R_MIPS_GPREL16
                }
            } else {
                RelocationType::R_MIPS_LO16
            };
            let index = ((*instr_rom - rom).inner() / 4) as usize;
            relocs[index] =
                Some(reloc_type.new_reloc_info(RelocReferencedSym::Address(*symbol_vram)));
        }

        for (instr_rom, symbol_vram) in instr_analysis.address_per_hi_instr() {
            if context.is_address_banned(*symbol_vram) {
                continue;
            }

            let index = ((*instr_rom - rom).inner() / 4) as usize;
            relocs[index] = Some(
                RelocationType::R_MIPS_HI16
                    .new_reloc_info(RelocReferencedSym::Address(*symbol_vram)),
            );
        }

        Ok(Self {
            ranges,
            instructions,
            raw_words,
            parent_segment_info,
            instr_analysis,
            relocs,
        })
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[must_use]
    pub(crate) fn raw_words(&self) -> &[u32] {
        &self.raw_words
    }

    #[must_use]
    pub fn instr_analysis(&self) -> &InstructionAnalysisResult {
        &self.instr_analysis
    }

    pub fn display<'ctx, 'sym, 'flg>(
        &'sym self,
        context: &'ctx Context,
        settings: &'flg FunctionDisplaySettings,
    ) -> Result<FunctionDisplay<'ctx, 'sym, 'flg>, SymDisplayError> {
        Ok(FunctionDisplay::new(context, self, settings))
    }
}

impl Symbol for SymbolFunction {
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
}

impl RomSymbol for SymbolFunction {
    #[must_use]
    fn rom_vram_range(&self) -> &RomVramRange {
        &self.ranges
    }
}

impl SymbolFunction {
    #[must_use]
    pub(crate) fn relocs(&self) -> &[Option<RelocationInfo>] {
        &self.relocs
    }
}
