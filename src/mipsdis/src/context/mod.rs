/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

pub mod symbols_segment;
mod the_context;

pub use symbols_segment::SymbolsSegment;
pub use the_context::{Context, OwnedSegmentNotFoundError};
