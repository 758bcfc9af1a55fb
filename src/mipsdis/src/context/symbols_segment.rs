/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::{btree_map::BTreeMap, btree_set::BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use crate::{
    addresses::{AddressRange, Rom, Size, Vram},
    collections::{FindSettings, SortedMap},
    metadata::{
        ContextSymbol, GeneratedBy, OverlayCategoryName, SymbolAttributes, SymbolType,
    },
    section_type::SectionType,
};

/// An address range owning a symbol table.
///
/// Defines a bijection between its vrom range (when it has one) and its vram
/// range. Segments are never aliased: a symbol lives in exactly one of them.
#[derive(Debug)]
pub struct SymbolsSegment {
    vrom: Option<AddressRange<Rom>>,
    vram: AddressRange<Vram>,

    overlay_category: Option<OverlayCategoryName>,
    is_the_unknown_segment: bool,

    symbols: SortedMap<Vram, ContextSymbol>,

    constants: BTreeMap<u32, ContextSymbol>,

    /// Stuff that looks like pointers, found referenced by data.
    new_pointers_in_data: SortedMap<Vram, Vram>,

    /// key: address of the `%lo` instruction, value: the vram to use instead
    /// of the one the pairing algorithm reconstructs.
    lo_patches: BTreeMap<Vram, Vram>,

    /// Data symbols allowed to hold references to other symbols with addends.
    data_syms_with_refs_with_addends: BTreeSet<Vram>,

    /// Data symbols allowed to reference named constants.
    data_referencing_constants: BTreeSet<Vram>,
}

impl SymbolsSegment {
    #[must_use]
    pub(crate) fn new(
        vrom: Option<AddressRange<Rom>>,
        vram: AddressRange<Vram>,
        overlay_category: Option<OverlayCategoryName>,
    ) -> Self {
        assert!(
            !vram.size().is_empty(),
            "A segment's vram range can't be empty. {:?}",
            vram
        );

        Self {
            vrom,
            vram,
            overlay_category,
            is_the_unknown_segment: false,
            symbols: SortedMap::new(),
            constants: BTreeMap::new(),
            new_pointers_in_data: SortedMap::new(),
            lo_patches: BTreeMap::new(),
            data_syms_with_refs_with_addends: BTreeSet::new(),
            data_referencing_constants: BTreeSet::new(),
        }
    }

    pub(crate) fn new_unknown_segment() -> Self {
        let mut segment = Self::new(
            None,
            AddressRange::new(Vram::new(0x00000000), Vram::new(0xFFFFFFFF)),
            None,
        );
        segment.is_the_unknown_segment = true;
        segment
    }

    #[must_use]
    pub const fn vrom_range(&self) -> Option<&AddressRange<Rom>> {
        self.vrom.as_ref()
    }
    #[must_use]
    pub const fn vram_range(&self) -> &AddressRange<Vram> {
        &self.vram
    }

    #[must_use]
    pub fn in_vrom_range(&self, vrom: Rom) -> bool {
        self.vrom.as_ref().is_some_and(|range| range.in_range(vrom))
    }
    #[must_use]
    pub fn in_vram_range(&self, vram: Vram) -> bool {
        self.vram.in_range(vram)
    }

    #[must_use]
    pub fn vrom_to_vram(&self, vrom: Rom) -> Option<Vram> {
        self.vrom
            .as_ref()
            .map(|range| self.vram.start() + (vrom - range.start()))
    }

    pub(crate) fn change_ranges(
        &mut self,
        vrom: AddressRange<Rom>,
        vram: AddressRange<Vram>,
    ) {
        assert!(!vram.size().is_empty());
        assert!(!vrom.size().is_empty());

        self.vrom = Some(vrom);
        self.vram = vram;
    }

    #[must_use]
    pub const fn overlay_category(&self) -> Option<&OverlayCategoryName> {
        self.overlay_category.as_ref()
    }

    #[must_use]
    pub const fn symbols(&self) -> &SortedMap<Vram, ContextSymbol> {
        &self.symbols
    }

    #[must_use]
    pub const fn constants(&self) -> &BTreeMap<u32, ContextSymbol> {
        &self.constants
    }
}

impl SymbolsSegment {
    /// Find-or-create entry point for symbols.
    ///
    /// Idempotent on the address: re-adding upgrades the section from unknown,
    /// fills a missing vrom and nothing else.
    pub fn add_symbol(
        &mut self,
        vram: Vram,
        vrom: Option<Rom>,
        generated_by: GeneratedBy,
        section_type: Option<SectionType>,
        allow_sym_with_addend: bool,
    ) -> &mut ContextSymbol {
        let overlay_category = self.overlay_category.clone();
        let unknown_segment = self.vrom.is_none() || self.is_the_unknown_segment;

        let sym = self.symbols.find_mut_or_insert_with(
            vram,
            FindSettings::new().with_allow_addend(allow_sym_with_addend),
            || {
                let mut new_sym = ContextSymbol::new(vram, generated_by);
                new_sym.set_overlay_category(overlay_category);
                new_sym
            },
        );

        sym.update_section_type(section_type);
        sym.update_rom(vrom);
        if unknown_segment {
            sym.add_attributes(SymbolAttributes::UNKNOWN_SEGMENT);
        }

        sym
    }

    pub fn add_function(
        &mut self,
        vram: Vram,
        vrom: Option<Rom>,
        generated_by: GeneratedBy,
    ) -> &mut ContextSymbol {
        let sym = self.add_symbol(vram, vrom, generated_by, Some(SectionType::Text), false);
        sym.upgrade_type(SymbolType::Function, generated_by);
        sym
    }

    pub fn add_branch_label(
        &mut self,
        vram: Vram,
        vrom: Option<Rom>,
        generated_by: GeneratedBy,
    ) -> &mut ContextSymbol {
        let sym = self.add_symbol(vram, vrom, generated_by, Some(SectionType::Text), false);
        sym.upgrade_type(SymbolType::BranchLabel, generated_by);
        sym
    }

    pub fn add_jumptable(
        &mut self,
        vram: Vram,
        vrom: Option<Rom>,
        generated_by: GeneratedBy,
    ) -> &mut ContextSymbol {
        let sym = self.add_symbol(vram, vrom, generated_by, Some(SectionType::Rodata), false);
        sym.upgrade_type(SymbolType::Jumptable, generated_by);
        sym
    }

    pub fn add_jumptable_label(
        &mut self,
        vram: Vram,
        vrom: Option<Rom>,
        generated_by: GeneratedBy,
    ) -> &mut ContextSymbol {
        let sym = self.add_symbol(vram, vrom, generated_by, Some(SectionType::Text), false);
        sym.upgrade_type(SymbolType::JumptableLabel, generated_by);
        sym
    }

    pub fn add_constant(&mut self, value: u32, name: String) -> &mut ContextSymbol {
        self.constants.entry(value).or_insert_with(|| {
            let mut sym = ContextSymbol::new(Vram::new(value), GeneratedBy::UserDeclared);
            *sym.user_declared_name_mut() = Some(name);
            sym.set_type(SymbolType::Constant, GeneratedBy::UserDeclared);
            sym
        })
    }

    #[must_use]
    pub fn get_constant(&self, value: u32) -> Option<&ContextSymbol> {
        self.constants.get(&value)
    }

    /// Searches a symbol, or a symbol which covers `vram` when the settings
    /// allow an addend.
    #[must_use]
    pub fn get_symbol(&self, vram: Vram, settings: FindSettings) -> Option<&ContextSymbol> {
        self.symbols.find(&vram, settings)
    }

    #[must_use]
    pub(crate) fn get_symbol_mut(
        &mut self,
        vram: Vram,
        settings: FindSettings,
    ) -> Option<&mut ContextSymbol> {
        self.symbols.find_mut(&vram, settings)
    }

    pub fn get_symbols_range(
        &self,
        address_start: Vram,
        address_end: Vram,
    ) -> impl Iterator<Item = (&Vram, &ContextSymbol)> {
        self.symbols.range(address_start..address_end)
    }

    pub(crate) fn get_symbols_range_mut(
        &mut self,
        address_start: Vram,
        address_end: Vram,
    ) -> impl Iterator<Item = (&Vram, &mut ContextSymbol)> {
        self.symbols.range_mut(address_start..address_end)
    }
}

impl SymbolsSegment {
    pub fn add_pointer_in_data_reference(&mut self, pointer: Vram) {
        self.new_pointers_in_data.insert(pointer, pointer);
    }

    pub fn pop_pointer_in_data_reference(&mut self, pointer: Vram) -> Option<Vram> {
        self.new_pointers_in_data.pop(&pointer)
    }

    pub fn get_and_pop_pointer_in_data_references_range(
        &mut self,
        low: Vram,
        high: Vram,
    ) -> Vec<Vram> {
        self.new_pointers_in_data
            .range_and_pop(low, high)
            .into_iter()
            .map(|(k, _)| k)
            .collect()
    }

    #[must_use]
    pub fn is_vram_a_possible_pointer_in_data(&self, vram: Vram) -> bool {
        self.new_pointers_in_data.contains_key(&vram)
    }

    #[must_use]
    pub fn new_pointers_in_data(&self) -> &SortedMap<Vram, Vram> {
        &self.new_pointers_in_data
    }

    pub fn add_lo_patch(&mut self, lo_instr_vram: Vram, target: Vram) {
        self.lo_patches.insert(lo_instr_vram, target);
    }

    #[must_use]
    pub fn get_lo_patch(&self, lo_instr_vram: Vram) -> Option<Vram> {
        self.lo_patches.get(&lo_instr_vram).copied()
    }

    pub fn add_data_sym_with_references_with_addends(&mut self, vram: Vram) {
        self.data_syms_with_refs_with_addends.insert(vram);
    }
    #[must_use]
    pub fn data_sym_allows_addend_references(&self, vram: Vram) -> bool {
        self.data_syms_with_refs_with_addends.contains(&vram)
    }

    pub fn add_data_referencing_constants(&mut self, vram: Vram) {
        self.data_referencing_constants.insert(vram);
    }
    #[must_use]
    pub fn data_sym_references_constants(&self, vram: Vram) -> bool {
        self.data_referencing_constants.contains(&vram)
    }
}

const CSV_HEADER: &str = "category,vram,rom,name,type,size,section,defined,user_declared,got,got_local,got_global,unknown_segment,elf_notype";

fn bool_to_csv(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn csv_to_bool(value: &str) -> bool {
    value == "True"
}

impl SymbolsSegment {
    fn write_symbol_csv_row(dst: &mut String, category: &str, sym: &ContextSymbol) {
        let _ = write!(dst, "{},0x{:08X},", category, sym.vram().inner());
        if let Some(rom) = sym.rom() {
            let _ = write!(dst, "0x{:X}", rom.inner());
        }
        let _ = write!(dst, ",{},", sym.user_declared_name().unwrap_or(""));
        if let Some(typ) = sym.sym_type() {
            let _ = write!(dst, "{}", typ.as_str());
        }
        let _ = write!(dst, ",");
        if let Some(size) = sym.size() {
            let _ = write!(dst, "0x{:X}", size.inner());
        }
        let _ = write!(dst, ",");
        if let Some(section) = sym.section_type() {
            let _ = write!(dst, "{}", section.name());
        }
        let _ = writeln!(
            dst,
            ",{},{},{},{},{},{},{}",
            bool_to_csv(sym.is_defined()),
            bool_to_csv(sym.is_user_declared()),
            bool_to_csv(sym.is_got()),
            bool_to_csv(sym.is_got_local()),
            bool_to_csv(sym.is_got_global()),
            bool_to_csv(sym.unknown_segment()),
            bool_to_csv(sym.is_elf_notype()),
        );
    }

    /// Serializes this segment's state as stable csv text: symbols first, then
    /// constants, then the pending pointer candidates, each in ascending
    /// address order.
    pub fn save_context(&self, dst: &mut String) {
        let _ = writeln!(dst, "{}", CSV_HEADER);

        for sym in self.symbols.values() {
            Self::write_symbol_csv_row(dst, "symbol", sym);
        }

        for constant in self.constants.values() {
            Self::write_symbol_csv_row(dst, "constants", constant);
        }

        for (address, _) in self.new_pointers_in_data.iter() {
            let _ = writeln!(dst, "new_pointer_in_data,0x{:08X}", address.inner());
        }
    }

    /// Restores a segment from text produced by [`SymbolsSegment::save_context`].
    ///
    /// Malformed rows are skipped, matching how the csv readers treat user
    /// input.
    pub fn parse_saved_context(&mut self, contents: &str) {
        for line in contents.lines() {
            let mut fields = line.splitn(14, ',');
            let category = match fields.next() {
                Some(x) => x,
                None => continue,
            };

            match category {
                "symbol" | "constants" => {
                    let row: Vec<&str> = fields.collect();
                    if row.len() != 13 {
                        continue;
                    }
                    self.parse_symbol_csv_row(category, &row);
                }
                "new_pointer_in_data" => {
                    if let Some(value) = fields
                        .next()
                        .and_then(|x| parse_hex(x))
                    {
                        self.add_pointer_in_data_reference(Vram::new(value));
                    }
                }
                _ => continue,
            }
        }
    }

    fn parse_symbol_csv_row(&mut self, category: &str, row: &[&str]) {
        let vram = match parse_hex(row[0]) {
            Some(x) => x,
            None => return,
        };
        let rom = parse_hex(row[1]).map(Rom::new);
        let name = row[2];
        let typ = SymbolType::from_str(row[3]);
        let size = parse_hex(row[4]).map(Size::new);
        let section = SectionType::from_name(row[5]);
        let defined = csv_to_bool(row[6]);
        let user_declared = csv_to_bool(row[7]);
        let generated_by = if user_declared {
            GeneratedBy::UserDeclared
        } else {
            GeneratedBy::Autogenerated
        };

        let mut attributes = SymbolAttributes::empty();
        if defined {
            attributes |= SymbolAttributes::DEFINED;
        }
        if csv_to_bool(row[8]) {
            attributes |= SymbolAttributes::GOT;
        }
        if csv_to_bool(row[9]) {
            attributes |= SymbolAttributes::GOT_LOCAL;
        }
        if csv_to_bool(row[10]) {
            attributes |= SymbolAttributes::GOT_GLOBAL;
        }
        if csv_to_bool(row[11]) {
            attributes |= SymbolAttributes::UNKNOWN_SEGMENT;
        }
        if csv_to_bool(row[12]) {
            attributes |= SymbolAttributes::ELF_NOTYPE;
        }

        if category == "constants" {
            let sym = self.add_constant(vram, name.to_string());
            sym.add_attributes(attributes);
            return;
        }

        let sym = self.add_symbol(Vram::new(vram), rom, generated_by, section, false);
        if user_declared {
            sym.set_user_declared();
        }
        if !name.is_empty() {
            *sym.user_declared_name_mut() = Some(name.to_string());
        }
        if let Some(typ) = typ {
            sym.set_type(typ, generated_by);
        }
        match generated_by {
            GeneratedBy::UserDeclared => *sym.user_declared_size_mut() = size,
            GeneratedBy::Autogenerated => *sym.autodetected_size_mut() = size,
        }
        sym.add_attributes(attributes);
    }
}

fn parse_hex(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16).ok()
}

impl SymbolsSegment {
    /// Rows of `vramHex,name`. A row with a `-` vram is skipped.
    pub fn read_functions_csv(&mut self, contents: &str) {
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }

            let mut fields = line.splitn(2, ',');
            let (vram_str, name) = match (fields.next(), fields.next()) {
                (Some(v), Some(n)) => (v, n),
                _ => continue,
            };
            if vram_str == "-" {
                continue;
            }
            let vram = match parse_hex(vram_str) {
                Some(x) => Vram::new(x),
                None => continue,
            };

            let sym = self.add_function(vram, None, GeneratedBy::UserDeclared);
            sym.set_user_declared();
            if !name.is_empty() {
                *sym.user_declared_name_mut() = Some(name.to_string());
            }
        }
    }

    /// Rows of `vramHex,name,type,sizeHex`. The type may be one of the
    /// special tags (`function`, `branchlabel`, `jumptable`,
    /// `jumptablelabel`, `hardwarereg`), a user type string, or empty.
    pub fn read_variables_csv(&mut self, contents: &str) {
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }

            let row: Vec<&str> = line.splitn(4, ',').collect();
            if row.len() != 4 {
                continue;
            }
            if row[0] == "-" {
                continue;
            }
            let vram = match parse_hex(row[0]) {
                Some(x) => Vram::new(x),
                None => continue,
            };
            let size = parse_hex(row[3]).map(Size::new);
            let var_type = SymbolType::from_str(row[2]);

            let sym = match &var_type {
                Some(SymbolType::Function) => {
                    self.add_function(vram, None, GeneratedBy::UserDeclared)
                }
                Some(SymbolType::BranchLabel) => {
                    self.add_branch_label(vram, None, GeneratedBy::UserDeclared)
                }
                Some(SymbolType::Jumptable) => {
                    self.add_jumptable(vram, None, GeneratedBy::UserDeclared)
                }
                Some(SymbolType::JumptableLabel) => {
                    self.add_jumptable_label(vram, None, GeneratedBy::UserDeclared)
                }
                _ => self.add_symbol(vram, None, GeneratedBy::UserDeclared, None, false),
            };

            sym.set_user_declared();
            if !row[1].is_empty() {
                *sym.user_declared_name_mut() = Some(row[1].to_string());
            }
            if let Some(typ) = var_type {
                sym.set_type(typ, GeneratedBy::UserDeclared);
            }
            *sym.user_declared_size_mut() = size;
        }
    }

    /// Rows of `valueHex,name`.
    pub fn read_constants_csv(&mut self, contents: &str) {
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }

            let mut fields = line.splitn(2, ',');
            let (value_str, name) = match (fields.next(), fields.next()) {
                (Some(v), Some(n)) => (v, n),
                _ => continue,
            };
            if value_str == "-" {
                continue;
            }
            let value = match parse_hex(value_str) {
                Some(x) => x,
                None => continue,
            };

            self.add_constant(value, name.to_string());
        }
    }
}

/// The libultra globals the OS leaves in low RAM.
const N64_LIBULTRA_SYMS: [(u32, &str, &str, u32); 9] = [
    (0x800001A0, "leoBootID", "u32", 0x4),
    (0x80000300, "osTvType", "u32", 0x4),
    (0x80000304, "osRomType", "u32", 0x4),
    (0x80000308, "osRomBase", "u32", 0x4),
    (0x8000030C, "osResetType", "u32", 0x4),
    (0x80000310, "osCicId", "u32", 0x4),
    (0x80000314, "osVersion", "u32", 0x4),
    (0x80000318, "osMemSize", "u32", 0x4),
    (0x8000031C, "osAppNmiBuffer", "u8", 0x40),
];

/// N64 OS hardware registers
const N64_HARDWARE_REGS: [(u32, &str); 76] = [
    // Signal Processor Registers
    (0xA4040000, "SP_MEM_ADDR_REG"),
    (0xA4040004, "SP_DRAM_ADDR_REG"),
    (0xA4040008, "SP_RD_LEN_REG"),
    (0xA404000C, "SP_WR_LEN_REG"),
    (0xA4040010, "SP_STATUS_REG"),
    (0xA4040014, "SP_DMA_FULL_REG"),
    (0xA4040018, "SP_DMA_BUSY_REG"),
    (0xA404001C, "SP_SEMAPHORE_REG"),
    (0xA4080000, "SP_PC"),
    // Display Processor Command Registers / Rasterizer Interface
    (0xA4100000, "DPC_START_REG"),
    (0xA4100004, "DPC_END_REG"),
    (0xA4100008, "DPC_CURRENT_REG"),
    (0xA410000C, "DPC_STATUS_REG"),
    (0xA4100010, "DPC_CLOCK_REG"),
    (0xA4100014, "DPC_BUFBUSY_REG"),
    (0xA4100018, "DPC_PIPEBUSY_REG"),
    (0xA410001C, "DPC_TMEM_REG"),
    // Display Processor Span Registers
    (0xA4200000, "DPS_TBIST_REG"), // DPS_TBIST_REG / DP_TMEM_BIST
    (0xA4200004, "DPS_TEST_MODE_REG"),
    (0xA4200008, "DPS_BUFTEST_ADDR_REG"),
    (0xA420000C, "DPS_BUFTEST_DATA_REG"),
    // MIPS Interface Registers
    (0xA4300000, "MI_MODE_REG"), // MI_MODE_REG / MI_INIT_MODE_REG
    (0xA4300004, "MI_VERSION_REG"),
    (0xA4300008, "MI_INTR_REG"),
    (0xA430000C, "MI_INTR_MASK_REG"),
    // Video Interface Registers
    (0xA4400000, "VI_STATUS_REG"), // VI_STATUS_REG / VI_CONTROL_REG
    (0xA4400004, "VI_DRAM_ADDR_REG"), // VI_DRAM_ADDR_REG / VI_ORIGIN_REG
    (0xA4400008, "VI_WIDTH_REG"),
    (0xA440000C, "VI_INTR_REG"),
    (0xA4400010, "VI_CURRENT_REG"),
    (0xA4400014, "VI_BURST_REG"), // VI_BURST_REG / VI_TIMING_REG
    (0xA4400018, "VI_V_SYNC_REG"),
    (0xA440001C, "VI_H_SYNC_REG"),
    (0xA4400020, "VI_LEAP_REG"),
    (0xA4400024, "VI_H_START_REG"),
    (0xA4400028, "VI_V_START_REG"),
    (0xA440002C, "VI_V_BURST_REG"),
    (0xA4400030, "VI_X_SCALE_REG"),
    (0xA4400034, "VI_Y_SCALE_REG"),
    // Audio Interface Registers
    (0xA4500000, "AI_DRAM_ADDR_REG"),
    (0xA4500004, "AI_LEN_REG"),
    (0xA4500008, "AI_CONTROL_REG"),
    (0xA450000C, "AI_STATUS_REG"),
    (0xA4500010, "AI_DACRATE_REG"),
    (0xA4500014, "AI_BITRATE_REG"),
    // Peripheral/Parallel Interface Registers
    (0xA4600000, "PI_DRAM_ADDR_REG"),
    (0xA4600004, "PI_CART_ADDR_REG"),
    (0xA4600005, "D_A4600005"), // TODO: figure out its name
    (0xA4600006, "D_A4600006"), // TODO: figure out its name
    (0xA4600007, "D_A4600007"), // TODO: figure out its name
    (0xA4600008, "PI_RD_LEN_REG"),
    (0xA460000C, "PI_WR_LEN_REG"),
    (0xA4600010, "PI_STATUS_REG"),
    (0xA4600014, "PI_BSD_DOM1_LAT_REG"), // PI dom1 latency
    (0xA4600018, "PI_BSD_DOM1_PWD_REG"), // PI dom1 pulse width
    (0xA460001C, "PI_BSD_DOM1_PGS_REG"), // PI dom1 page size
    (0xA4600020, "PI_BSD_DOM1_RLS_REG"), // PI dom1 release
    (0xA4600024, "PI_BSD_DOM2_LAT_REG"), // PI dom2 latency
    (0xA4600028, "PI_BSD_DOM2_LWD_REG"), // PI dom2 pulse width
    (0xA460002C, "PI_BSD_DOM2_PGS_REG"), // PI dom2 page size
    (0xA4600030, "PI_BSD_DOM2_RLS_REG"), // PI dom2 release
    // RDRAM Interface Registers
    (0xA4700000, "RI_MODE_REG"),
    (0xA4700004, "RI_CONFIG_REG"),
    (0xA4700008, "RI_CURRENT_LOAD_REG"),
    (0xA470000C, "RI_SELECT_REG"),
    (0xA4700010, "RI_REFRESH_REG"),
    (0xA4700014, "RI_LATENCY_REG"),
    (0xA4700018, "RI_RERROR_REG"),
    (0xA470001C, "RI_WERROR_REG"),
    // Serial Interface Registers
    (0xA4800000, "SI_DRAM_ADDR_REG"),
    (0xA4800004, "SI_PIF_ADDR_RD64B_REG"),
    (0xA4800008, "D_A4800008"), // reserved
    (0xA480000C, "D_A480000C"), // reserved
    (0xA4800010, "SI_PIF_ADDR_WR64B_REG"),
    (0xA4800014, "D_A4800014"), // reserved
    (0xA4800018, "SI_STATUS_REG"),
];

impl SymbolsSegment {
    pub fn fill_libultra_symbols(&mut self) {
        for (vram, name, typ, size) in N64_LIBULTRA_SYMS {
            let sym = self.add_symbol(Vram::new(vram), None, GeneratedBy::UserDeclared, None, false);
            sym.set_user_declared();
            *sym.user_declared_name_mut() = Some(name.into());
            sym.set_type(
                SymbolType::from_str(typ).expect("Built-in types can't be empty"),
                GeneratedBy::UserDeclared,
            );
            *sym.user_declared_size_mut() = Some(Size::new(size));
            sym.set_defined();
        }
    }

    pub fn fill_hardware_regs(&mut self, use_real_names: bool) {
        for (vram, name) in N64_HARDWARE_REGS {
            let sym = self.add_symbol(Vram::new(vram), None, GeneratedBy::UserDeclared, None, false);
            sym.set_user_declared();
            if use_real_names {
                *sym.user_declared_name_mut() = Some(name.into());
            }
            sym.set_type(SymbolType::HardwareReg, GeneratedBy::UserDeclared);
            *sym.user_declared_size_mut() = Some(Size::new(4));
            sym.set_defined();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_test_segment() -> SymbolsSegment {
        SymbolsSegment::new(
            Some(AddressRange::new(Rom::new(0), Rom::new(0x1000))),
            AddressRange::new(Vram::new(0x80000000), Vram::new(0x80001000)),
            None,
        )
    }

    #[test]
    fn add_symbol_is_idempotent() {
        let mut segment = new_test_segment();

        segment.add_symbol(
            Vram::new(0x80000100),
            None,
            GeneratedBy::Autogenerated,
            None,
            false,
        );
        segment.add_symbol(
            Vram::new(0x80000100),
            Some(Rom::new(0x100)),
            GeneratedBy::Autogenerated,
            Some(SectionType::Data),
            false,
        );

        assert_eq!(segment.symbols().len(), 1);
        let sym = segment
            .get_symbol(
                Vram::new(0x80000100),
                FindSettings::new().with_allow_addend(false),
            )
            .unwrap();
        assert_eq!(sym.section_type(), Some(SectionType::Data));
        assert_eq!(sym.rom(), Some(Rom::new(0x100)));
    }

    #[test]
    fn function_does_not_replace_jumptable_label() {
        let mut segment = new_test_segment();

        segment.add_jumptable_label(Vram::new(0x80000200), None, GeneratedBy::Autogenerated);
        let sym = segment.add_function(Vram::new(0x80000200), None, GeneratedBy::Autogenerated);

        assert_eq!(sym.sym_type(), Some(&SymbolType::JumptableLabel));
    }

    #[test]
    fn pointer_drain_is_end_exclusive() {
        let mut segment = new_test_segment();

        segment.add_pointer_in_data_reference(Vram::new(0x80000400));
        segment.add_pointer_in_data_reference(Vram::new(0x80000500));

        let drained =
            segment.get_and_pop_pointer_in_data_references_range(
                Vram::new(0x80000400),
                Vram::new(0x80000500),
            );
        assert_eq!(drained, [Vram::new(0x80000400)]);
        assert!(segment.is_vram_a_possible_pointer_in_data(Vram::new(0x80000500)));
    }

    #[test]
    fn functions_csv_declares_user_functions() {
        let mut segment = new_test_segment();

        segment.read_functions_csv("80000400,bootproc\n-,skipped\nzzz,bad\n");

        let sym = segment
            .get_symbol(
                Vram::new(0x80000400),
                FindSettings::new().with_allow_addend(false),
            )
            .unwrap();
        assert_eq!(sym.user_declared_name(), Some("bootproc"));
        assert_eq!(sym.sym_type(), Some(&SymbolType::Function));
        assert!(sym.is_user_declared());
        assert_eq!(segment.symbols().len(), 1);
    }

    #[test]
    fn builtin_tables_keep_their_placeholder_names() {
        let mut segment = SymbolsSegment::new(
            None,
            AddressRange::new(Vram::new(0x80000000), Vram::new(0xFFFFFFFF)),
            None,
        );

        segment.fill_libultra_symbols();
        segment.fill_hardware_regs(true);

        let os_tv_type = segment
            .get_symbol(
                Vram::new(0x80000300),
                FindSettings::new().with_allow_addend(false),
            )
            .unwrap();
        assert_eq!(os_tv_type.user_declared_name(), Some("osTvType"));
        assert_eq!(os_tv_type.user_declared_size(), Some(Size::new(4)));

        // The three PI registers nobody has named yet.
        for vram in [0xA4600005, 0xA4600006, 0xA4600007] {
            let sym = segment
                .get_symbol(
                    Vram::new(vram),
                    FindSettings::new().with_allow_addend(false),
                )
                .unwrap();
            assert_eq!(
                sym.user_declared_name(),
                Some(alloc::format!("D_{:08X}", vram).as_str())
            );
            assert_eq!(sym.sym_type(), Some(&SymbolType::HardwareReg));
        }
    }

    #[test]
    fn save_and_parse_round_trip() {
        let mut segment = new_test_segment();

        segment.read_variables_csv("80000410,gBuffer,u8,100\n80000510,gState,,4\n");
        segment.read_constants_csv("DEADBEEF,MAGIC\n");
        segment.add_pointer_in_data_reference(Vram::new(0x80000800));

        let mut saved = String::new();
        segment.save_context(&mut saved);

        let mut reloaded = new_test_segment();
        reloaded.parse_saved_context(&saved);

        let mut resaved = String::new();
        reloaded.save_context(&mut resaved);

        assert_eq!(saved, resaved);
    }
}
