/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use mipsdis::addresses::{AddressRange, Rom, Vram};
use mipsdis::config::{Endian, GlobalConfig};
use mipsdis::context::Context;
use mipsdis::metadata::OverlayCategoryName;
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
        AddressRange::new(Rom::new(0), Rom::new(0x1000)),
        AddressRange::new(Vram::new(0x80000000), Vram::new(0x80001000)),
    );
    context
}

#[test]
fn overlays_with_the_same_vram_emit_their_own_symbols() {
    let mut context = new_context();

    let cat_a = OverlayCategoryName::new("A".into());
    let cat_b = OverlayCategoryName::new("B".into());
    let overlay_vram = AddressRange::new(Vram::new(0x80200000), Vram::new(0x80201000));

    context
        .add_overlay_segment(
            cat_a.clone(),
            AddressRange::new(Rom::new(0x1000), Rom::new(0x2000)),
            overlay_vram,
        )
        .read_variables_csv("80200000,a_sym,,4\n");
    context
        .add_overlay_segment(
            cat_b.clone(),
            AddressRange::new(Rom::new(0x2000), Rom::new(0x3000)),
            overlay_vram,
        )
        .read_variables_csv("80200000,b_sym,,4\n");

    let info_a = ParentSegmentInfo::new(Rom::new(0x1000), Some(cat_a));
    let info_b = ParentSegmentInfo::new(Rom::new(0x2000), Some(cat_b));

    // Both overlays hold a pointer to 0x80200000 at the same vram.
    let mut section_a = DataSection::new(
        &DataSectionSettings::new(),
        ".data".into(),
        vec![0x80, 0x20, 0x00, 0x00],
        Rom::new(0x1100),
        Vram::new(0x80200100),
        mipsdis::section_type::SectionType::Data,
        info_a,
    );
    section_a.analyze(&mut context).unwrap();

    let mut section_b = DataSection::new(
        &DataSectionSettings::new(),
        ".data".into(),
        vec![0x80, 0x20, 0x00, 0x00],
        Rom::new(0x2100),
        Vram::new(0x80200100),
        mipsdis::section_type::SectionType::Data,
        info_b,
    );
    section_b.analyze(&mut context).unwrap();

    let listing_a = section_a
        .disassemble(&context, &SymDataDisplaySettings::new())
        .unwrap();
    let listing_b = section_b
        .disassemble(&context, &SymDataDisplaySettings::new())
        .unwrap();

    assert!(listing_a.contains(".word a_sym\n"), "{}", listing_a);
    assert!(listing_b.contains(".word b_sym\n"), "{}", listing_b);
}

#[test]
fn got_globals_bind_to_global_segment_symbols() {
    let mut context = new_context();

    context.init_got_table(
        Vram::new(0x80000800),
        vec![0x80000000, 0x80000040],
        vec![0x80000900, 0x80000980],
    );

    let entry = context
        .got()
        .got_sym_entry(0x80000980)
        .expect("the entry should exist");
    assert_eq!(entry.context_sym(), Some(Vram::new(0x80000980)));

    let sym = context
        .global_segment()
        .get_symbol(
            Vram::new(0x80000980),
            mipsdis::collections::FindSettings::new().with_allow_addend(false),
        )
        .unwrap();
    assert!(sym.is_user_declared());
    assert!(sym.is_got_global());
}

#[test]
fn saved_context_files_cover_every_segment() {
    let mut context = new_context();
    context
        .global_segment_mut()
        .read_variables_csv("80000400,gState,u32,4\n");
    context.add_overlay_segment(
        OverlayCategoryName::new("actors".into()),
        AddressRange::new(Rom::new(0x9000), Rom::new(0xA000)),
        AddressRange::new(Vram::new(0x80200000), Vram::new(0x80201000)),
    );

    let saved = context.save_context("context", ".csv");
    let names: Vec<&str> = saved.iter().map(|(name, _)| name.as_str()).collect();

    assert_eq!(
        names,
        [
            "context.csv",
            "context_unksegment.csv",
            "context_actors_009000.csv"
        ]
    );
    assert!(saved[0].1.contains("symbol,0x80000400,,gState,u32,0x4"));
}
