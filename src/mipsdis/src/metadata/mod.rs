/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod context_symbol;
mod overlay_category_name;
mod symbol_name_display;
mod symbol_type;

pub use context_symbol::{ContextSymbol, GeneratedBy, SymbolAttributes, SymbolIndex};
pub use overlay_category_name::OverlayCategoryName;
pub use symbol_name_display::SymbolNameDisplay;
pub use symbol_type::SymbolType;
