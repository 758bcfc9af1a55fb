/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod function_display;
mod internal_common;
mod sym_bss_display;
mod sym_data_display;
mod sym_display_error;

pub use function_display::{FunctionDisplay, FunctionDisplaySettings};
pub use sym_bss_display::{SymBssDisplay, SymBssDisplaySettings};
pub use sym_data_display::{SymDataDisplay, SymDataDisplaySettings};
pub use sym_display_error::SymDisplayError;
