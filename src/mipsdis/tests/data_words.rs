/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use mipsdis::addresses::{AddressRange, Rom, Vram};
use mipsdis::collections::FindSettings;
use mipsdis::config::{Endian, GlobalConfig};
use mipsdis::context::Context;
use mipsdis::parent_segment_info::ParentSegmentInfo;
use mipsdis::sections::{DataSection, DataSectionSettings};
use mipsdis::symbols::display::SymDataDisplaySettings;

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
    context.fill_default_banned_symbols();
    context
}

fn global_info() -> ParentSegmentInfo {
    ParentSegmentInfo::new(Rom::new(0), None)
}

fn disassemble_rodata(context: &mut Context, bytes: Vec<u8>, vram: u32) -> String {
    let mut section = DataSection::new_rodata(
        &DataSectionSettings::new(),
        ".rodata".into(),
        bytes,
        Rom::new(0x400),
        Vram::new(vram),
        global_info(),
    );
    section.analyze(context).unwrap();
    section
        .disassemble(context, &SymDataDisplaySettings::new())
        .unwrap()
}

#[test]
fn float_literals_decode() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,float32,4\n");

    let listing = disassemble_rodata(&mut context, vec![0x3F, 0x80, 0x00, 0x00], 0x80001000);
    assert_eq!(listing, "dlabel FLT_80001000\n .float 1\n");
}

#[test]
fn nan_is_not_a_float_literal() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,float32,4\n");

    // The symbol keeps its user-declared type, but the value is rejected and
    // renders as a raw word.
    let listing = disassemble_rodata(&mut context, vec![0x7F, 0xC0, 0x00, 0x00], 0x80001000);
    assert_eq!(listing, "dlabel FLT_80001000\n .word 0x7FC00000\n");
}

#[test]
fn double_literals_decode() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,float64,8\n");

    // 1.0 as an IEEE double.
    let listing = disassemble_rodata(
        &mut context,
        vec![0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        0x80001000,
    );
    assert_eq!(listing, "dlabel DBL_80001000\n .double 1\n");
}

#[test]
fn words_matching_a_sized_symbol_become_references_with_addends() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80010000,foo,,40\n");

    let mut section = DataSection::new(
        &DataSectionSettings::new(),
        ".data".into(),
        vec![0x80, 0x01, 0x00, 0x10],
        Rom::new(0x800),
        Vram::new(0x80002000),
        mipsdis::section_type::SectionType::Data,
        global_info(),
    );
    section.analyze(&mut context).unwrap();
    let listing = section
        .disassemble(&context, &SymDataDisplaySettings::new())
        .unwrap();

    assert_eq!(listing, "dlabel D_80002000\n .word foo + 0x10\n");
}

#[test]
fn banned_addresses_never_become_symbols() {
    let mut context = new_context();

    let listing = disassemble_rodata(&mut context, vec![0x7F, 0xFF, 0xFF, 0xF0], 0x80001000);
    assert_eq!(listing, "dlabel D_80001000\n .word 0x7FFFFFF0\n");

    assert!(context
        .unknown_segment()
        .get_symbol(Vram::new(0x7FFFFFF0), FindSettings::new())
        .is_none());
    assert!(!context
        .global_segment()
        .is_vram_a_possible_pointer_in_data(Vram::new(0x7FFFFFF0)));
}

#[test]
fn clean_strings_decode_with_their_padding() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,cstring,\n");

    let listing = disassemble_rodata(&mut context, b"hi!\0".to_vec(), 0x80001000);
    assert_eq!(listing, "dlabel STR_80001000\n .asciz \"hi!\"\n");

    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,cstring,\n");

    let listing = disassemble_rodata(&mut context, b"hello\0\0\0".to_vec(), 0x80001000);
    assert_eq!(
        listing,
        "dlabel STR_80001000\n .asciz \"hello\"\n .balign 4\n"
    );
}

#[test]
fn undecodable_strings_fall_back_to_words() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,cstring,\n");

    // 0x80 is not a valid EUC-JP lead byte on its own.
    let listing = disassemble_rodata(&mut context, vec![0x80, 0x41, 0x00, 0x00], 0x80001000);
    assert_eq!(listing, "dlabel D_80001000\n .word 0x80410000\n");

    let sym = context
        .global_segment()
        .get_symbol(Vram::new(0x80001000), FindSettings::new())
        .unwrap();
    assert!(sym.failed_string_decoding());
}

#[test]
fn jumptables_render_their_targets_as_labels() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,jumptable,C\n");

    let listing = disassemble_rodata(
        &mut context,
        vec![
            0x80, 0x00, 0x04, 0x10, //
            0x80, 0x00, 0x04, 0x20, //
            0x80, 0x00, 0x04, 0x30, //
        ],
        0x80001000,
    );
    assert_eq!(
        listing,
        "dlabel jtbl_80001000\n .word L80000410\n .word L80000420\n .word L80000430\n"
    );

    let label = context
        .global_segment()
        .get_symbol(
            Vram::new(0x80000410),
            FindSettings::new().with_allow_addend(false),
        )
        .unwrap();
    assert!(label.is_jumptable_label());
}

#[test]
fn allowed_data_symbols_reference_named_constants() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_constants_csv("DEADBEEF,MAGIC\n");
    context
        .global_segment_mut()
        .add_data_referencing_constants(Vram::new(0x80002000));

    let mut section = DataSection::new(
        &DataSectionSettings::new(),
        ".data".into(),
        vec![0xDE, 0xAD, 0xBE, 0xEF],
        Rom::new(0x800),
        Vram::new(0x80002000),
        mipsdis::section_type::SectionType::Data,
        global_info(),
    );
    section.analyze(&mut context).unwrap();
    let listing = section
        .disassemble(&context, &SymDataDisplaySettings::new())
        .unwrap();

    assert_eq!(listing, "dlabel D_80002000\n .word MAGIC\n");
}

#[test]
fn asm_comments_carry_rom_vram_and_word() {
    let config = GlobalConfig::new(Endian::Big).with_produce_symbols_plus_offset(true);
    let mut context = Context::new(config);
    context.change_global_segment_ranges(
        AddressRange::new(Rom::new(0), Rom::new(0x100000)),
        AddressRange::new(Vram::new(0x80000000), Vram::new(0x80200000)),
    );
    context
        .global_segment_mut()
        .read_variables_csv("80001000,,float32,4\n");

    let listing = disassemble_rodata(&mut context, vec![0x3F, 0x80, 0x00, 0x00], 0x80001000);
    assert_eq!(
        listing,
        "dlabel FLT_80001000\n/* 000400 80001000 3F800000 */ .float 1\n"
    );
}

#[test]
fn disassembly_is_deterministic() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80010000,foo,,40\n");

    let mut section = DataSection::new(
        &DataSectionSettings::new(),
        ".data".into(),
        vec![
            0x80, 0x01, 0x00, 0x10, //
            0x00, 0x00, 0x00, 0x2A, //
        ],
        Rom::new(0x800),
        Vram::new(0x80002000),
        mipsdis::section_type::SectionType::Data,
        global_info(),
    );
    section.analyze(&mut context).unwrap();

    let first = section
        .disassemble(&context, &SymDataDisplaySettings::new())
        .unwrap();
    let second = section
        .disassemble(&context, &SymDataDisplaySettings::new())
        .unwrap();
    assert_eq!(first, second);
}
