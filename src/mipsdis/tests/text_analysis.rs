/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use mipsdis::addresses::{AddressRange, Rom, Vram};
use mipsdis::collections::FindSettings;
use mipsdis::config::{Endian, GlobalConfig};
use mipsdis::context::Context;
use mipsdis::parent_segment_info::ParentSegmentInfo;
use mipsdis::sections::{BssSection, TextSection, TextSectionSettings};
use mipsdis::symbols::display::{FunctionDisplaySettings, SymBssDisplaySettings};

use rabbitizer::{InstructionDisplayFlags, InstructionFlags, IsaVersion};

use pretty_assertions::assert_eq;

fn new_context() -> Context {
    let config = GlobalConfig::new(Endian::Big).with_produce_symbols_plus_offset(true);
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

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn new_text_section(words: &[u32], rom: u32, vram: u32) -> TextSection {
    TextSection::new(
        TextSectionSettings::new(InstructionFlags::new(IsaVersion::MIPS_III)),
        ".text".into(),
        words_to_bytes(words),
        Rom::new(rom),
        Vram::new(vram),
        global_info(),
    )
}

#[test]
fn a_function_ends_at_jr_ra() {
    let mut context = new_context();

    let mut section = new_text_section(
        &[
            0x03E00008, // jr    $ra
            0x00000000, // nop
            0x03E00008, // jr    $ra
            0x00000000, // nop
        ],
        0x400,
        0x80000400,
    );
    section.analyze(&mut context).unwrap();

    assert_eq!(section.functions().len(), 2);

    let listing = section
        .disassemble(
            &context,
            &FunctionDisplaySettings::new(InstructionDisplayFlags::default()),
        )
        .unwrap();
    assert!(listing.contains("glabel func_80000400"));
    assert!(listing.contains("glabel func_80000408"));
}

#[test]
fn hi_lo_pairs_reconstruct_addresses() {
    let mut context = new_context();

    let mut section = new_text_section(
        &[
            0x3C048010, // lui   $a0, 0x8010
            0x24840040, // addiu $a0, $a0, 0x40
            0x03E00008, // jr    $ra
            0x00000000, // nop
        ],
        0x400,
        0x80000400,
    );
    section.analyze(&mut context).unwrap();

    assert_eq!(section.functions().len(), 1);

    // The reconstructed address exists as an autogenerated symbol and as a
    // pointer candidate for later sections.
    let sym = context
        .global_segment()
        .get_symbol(
            Vram::new(0x80100040),
            FindSettings::new().with_allow_addend(false),
        )
        .expect("hi/lo pairing should have created the symbol");
    assert!(sym.is_autogenerated());
    assert_eq!(sym.reference_counter(), 1);
    assert!(context
        .global_segment()
        .is_vram_a_possible_pointer_in_data(Vram::new(0x80100040)));

    let listing = section
        .disassemble(
            &context,
            &FunctionDisplaySettings::new(InstructionDisplayFlags::default()),
        )
        .unwrap();
    assert!(listing.contains("%hi(D_80100040)"));
    assert!(listing.contains("%lo(D_80100040)"));
}

#[test]
fn text_pointers_flow_into_bss_variables() {
    let mut context = new_context();

    let mut text = new_text_section(
        &[
            0x3C048010, // lui   $a0, 0x8010
            0x24840040, // addiu $a0, $a0, 0x40
            0x03E00008, // jr    $ra
            0x00000000, // nop
        ],
        0x400,
        0x80000400,
    );
    text.analyze(&mut context).unwrap();

    let mut bss = BssSection::new(
        ".bss".into(),
        AddressRange::new(Vram::new(0x80100000), Vram::new(0x80100100)),
        None,
        global_info(),
    );
    bss.analyze(&mut context).unwrap();

    let spaces: Vec<u32> = bss
        .bss_symbols()
        .iter()
        .map(|sym| sym.space().inner())
        .collect();
    assert_eq!(spaces, [0x40, 0xC0]);

    let listing = bss
        .disassemble(&context, &SymBssDisplaySettings::new())
        .unwrap();
    assert!(listing.contains("dlabel D_80100040"));
}

#[test]
fn branch_targets_become_labels() {
    let mut context = new_context();

    let mut section = new_text_section(
        &[
            0x10000003, // beq   $zero, $zero, .L80000410
            0x00000000, // nop
            0x00000000, // nop
            0x00000000, // nop
            0x03E00008, // jr    $ra (.L80000410)
            0x00000000, // nop
        ],
        0x400,
        0x80000400,
    );
    section.analyze(&mut context).unwrap();

    assert_eq!(section.functions().len(), 1);

    let label = context
        .global_segment()
        .get_symbol(
            Vram::new(0x80000410),
            FindSettings::new().with_allow_addend(false),
        )
        .expect("the branch should have created a label");
    assert!(label.is_branch_label());

    let listing = section
        .disassemble(
            &context,
            &FunctionDisplaySettings::new(InstructionDisplayFlags::default()),
        )
        .unwrap();
    assert!(listing.contains(".L80000410:"));
    assert!(listing.contains(".L80000410\n") || listing.contains(".L80000410 "));
}

#[test]
fn function_calls_create_function_symbols() {
    let mut context = new_context();

    let mut section = new_text_section(
        &[
            0x0C000106, // jal   func_80000418
            0x00000000, // nop
            0x03E00008, // jr    $ra
            0x00000000, // nop
            0x00000000, // nop
            0x00000000, // nop
            0x03E00008, // jr    $ra (func_80000418)
            0x00000000, // nop
        ],
        0x400,
        0x80000400,
    );
    section.analyze(&mut context).unwrap();

    let callee = context
        .global_segment()
        .get_symbol(
            Vram::new(0x80000418),
            FindSettings::new().with_allow_addend(false),
        )
        .expect("the jal should have created a function");
    assert!(callee.is_function());

    let listing = section
        .disassemble(
            &context,
            &FunctionDisplaySettings::new(InstructionDisplayFlags::default()),
        )
        .unwrap();
    assert!(listing.contains("glabel func_80000418"));
}

#[test]
fn lo_patches_redirect_the_reconstructed_target() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .add_lo_patch(Vram::new(0x80000404), Vram::new(0x80100044));

    let mut section = new_text_section(
        &[
            0x3C048010, // lui   $a0, 0x8010
            0x24840040, // addiu $a0, $a0, 0x40
            0x03E00008, // jr    $ra
            0x00000000, // nop
        ],
        0x400,
        0x80000400,
    );
    section.analyze(&mut context).unwrap();

    assert!(context
        .global_segment()
        .get_symbol(
            Vram::new(0x80100044),
            FindSettings::new().with_allow_addend(false),
        )
        .is_some());
    assert!(context
        .global_segment()
        .get_symbol(
            Vram::new(0x80100040),
            FindSettings::new().with_allow_addend(false),
        )
        .is_none());
}

#[test]
fn user_functions_split_the_section() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_functions_csv("80000408,do_thing\n");

    let mut section = new_text_section(
        &[
            0x00000000, // nop
            0x00000000, // nop
            0x03E00008, // jr    $ra (do_thing)
            0x00000000, // nop
        ],
        0x400,
        0x80000400,
    );
    section.analyze(&mut context).unwrap();

    assert_eq!(section.functions().len(), 2);

    let listing = section
        .disassemble(
            &context,
            &FunctionDisplaySettings::new(InstructionDisplayFlags::default()),
        )
        .unwrap();
    assert!(listing.contains("glabel do_thing"));
}
