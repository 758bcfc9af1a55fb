/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use crate::addresses::GpValue;

/// `$gp` related settings: the register's runtime value and whether the code
/// is position independent.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct GpConfig {
    gp_value: GpValue,
    pic: bool,
}

impl GpConfig {
    #[must_use]
    pub const fn new_sdata(gp_value: GpValue) -> Self {
        Self {
            gp_value,
            pic: false,
        }
    }

    #[must_use]
    pub const fn new_pic(gp_value: GpValue) -> Self {
        Self {
            gp_value,
            pic: true,
        }
    }

    #[must_use]
    pub const fn gp_value(&self) -> GpValue {
        self.gp_value
    }

    #[must_use]
    pub const fn pic(&self) -> bool {
        self.pic
    }
}
