/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use crate::addresses::Rom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct LoPairingInfo {
    pub(crate) instr_rom: Rom,
    pub(crate) value: i64,
    pub(crate) is_gp_rel: bool,
    pub(crate) is_gp_got: bool,
}
