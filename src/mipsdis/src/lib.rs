/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
pub extern crate rabbitizer;

pub mod addresses;
pub mod analysis;
pub mod collections;
pub mod config;
pub mod context;
pub mod file_splits;
pub mod metadata;
pub mod parent_segment_info;
pub mod relocation;
pub mod section_type;
pub mod sections;
pub mod str_decoding;
pub mod symbols;
