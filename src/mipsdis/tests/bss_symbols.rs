/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use mipsdis::addresses::{AddressRange, Rom, Vram};
use mipsdis::config::{Endian, GlobalConfig};
use mipsdis::context::Context;
use mipsdis::parent_segment_info::ParentSegmentInfo;
use mipsdis::sections::BssSection;
use mipsdis::symbols::display::SymBssDisplaySettings;
use mipsdis::symbols::Symbol;

use pretty_assertions::assert_eq;

fn new_context() -> Context {
    let config = GlobalConfig::new(Endian::Big)
        .with_asm_comment(false)
        .with_produce_symbols_plus_offset(true);
    let mut context = Context::new(config);
    context.change_global_segment_ranges(
        AddressRange::new(Rom::new(0), Rom::new(0x100000)),
        AddressRange::new(Vram::new(0x80000000), Vram::new(0x80200000)),
    );
    context
}

fn global_info() -> ParentSegmentInfo {
    ParentSegmentInfo::new(Rom::new(0), None)
}

#[test]
fn bss_variables_are_sized_by_their_next_neighbor() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80100000,a,,\n80100008,b,,\n");

    let mut section = BssSection::new(
        ".bss".into(),
        AddressRange::new(Vram::new(0x80100000), Vram::new(0x80100020)),
        None,
        global_info(),
    );
    section.analyze(&mut context).unwrap();

    let spaces: Vec<u32> = section
        .bss_symbols()
        .iter()
        .map(|sym| sym.space().inner())
        .collect();
    assert_eq!(spaces, [0x08, 0x18]);

    let listing = section
        .disassemble(&context, &SymBssDisplaySettings::new())
        .unwrap();
    assert_eq!(
        listing,
        "dlabel a\n .space 0x08\n\ndlabel b\n .space 0x18\n"
    );
}

#[test]
fn adjacent_bss_spaces_tile_the_whole_section() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80100010,gSched,,\n80100030,gQueue,,\n80100044,gMsg,,\n");

    let total_size = 0x80;
    let mut section = BssSection::new(
        ".bss".into(),
        AddressRange::new(Vram::new(0x80100000), Vram::new(0x80100000 + total_size)),
        None,
        global_info(),
    );
    section.analyze(&mut context).unwrap();

    let syms = section.bss_symbols();
    assert!(!syms.is_empty());
    for pair in syms.windows(2) {
        let offset = (pair[0].vram_range().start() - Vram::new(0x80100000)).inner() as u32;
        let next_offset = (pair[1].vram_range().start() - Vram::new(0x80100000)).inner() as u32;
        assert_eq!(next_offset - offset, pair[0].space().inner());
    }
    let last = syms.last().unwrap();
    let last_offset = (last.vram_range().start() - Vram::new(0x80100000)).inner() as u32;
    assert_eq!(total_size - last_offset, last.space().inner());
}

#[test]
fn pointers_found_in_data_become_bss_variables() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .add_pointer_in_data_reference(Vram::new(0x80100040));

    let mut section = BssSection::new(
        ".bss".into(),
        AddressRange::new(Vram::new(0x80100000), Vram::new(0x80100100)),
        None,
        global_info(),
    );
    section.analyze(&mut context).unwrap();

    let spaces: Vec<u32> = section
        .bss_symbols()
        .iter()
        .map(|sym| sym.space().inner())
        .collect();
    assert_eq!(spaces, [0x40, 0xC0]);

    let listing = section
        .disassemble(&context, &SymBssDisplaySettings::new())
        .unwrap();
    assert_eq!(
        listing,
        "dlabel D_80100000\n .space 0x40\n\ndlabel D_80100040\n .space 0xC0\n"
    );
}

#[test]
fn pointer_candidate_at_section_end_is_not_drained() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .add_pointer_in_data_reference(Vram::new(0x80100100));

    let mut section = BssSection::new(
        ".bss".into(),
        AddressRange::new(Vram::new(0x80100000), Vram::new(0x80100100)),
        None,
        global_info(),
    );
    section.analyze(&mut context).unwrap();

    // End-exclusive: the candidate right at the section end stays put.
    assert!(context
        .global_segment()
        .is_vram_a_possible_pointer_in_data(Vram::new(0x80100100)));
    assert_eq!(section.bss_symbols().len(), 1);
    assert_eq!(section.bss_symbols()[0].space().inner(), 0x100);
}

#[test]
fn user_declared_size_caps_the_variable() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80100000,gBuffer,,8\n80100010,gState,,\n");

    let mut section = BssSection::new(
        ".bss".into(),
        AddressRange::new(Vram::new(0x80100000), Vram::new(0x80100020)),
        None,
        global_info(),
    );
    section.analyze(&mut context).unwrap();

    let spaces: Vec<(u32, u32)> = section
        .bss_symbols()
        .iter()
        .map(|sym| (sym.vram_range().start().inner(), sym.space().inner()))
        .collect();
    // The synthetic boundary at +0x8 caps gBuffer without emitting anything
    // itself.
    assert_eq!(spaces, [(0x80100000, 0x8), (0x80100010, 0x10)]);
}

#[test]
fn user_symbols_survive_reanalysis() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80100008,b,,4\n");

    let mut section = BssSection::new(
        ".bss".into(),
        AddressRange::new(Vram::new(0x80100000), Vram::new(0x80100020)),
        None,
        global_info(),
    );
    section.analyze(&mut context).unwrap();
    let first = section
        .disassemble(&context, &SymBssDisplaySettings::new())
        .unwrap();

    section.analyze(&mut context).unwrap();
    let second = section
        .disassemble(&context, &SymBssDisplaySettings::new())
        .unwrap();

    assert_eq!(first, second);
    assert!(second.contains("dlabel b\n"));
}
