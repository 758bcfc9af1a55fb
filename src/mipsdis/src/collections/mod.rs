/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

pub mod sorted_map;

pub use sorted_map::{FindSettings, SizedAddress, SortedMap};
