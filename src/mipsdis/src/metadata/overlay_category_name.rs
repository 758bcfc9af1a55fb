/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;
use core::fmt;

/// Name of an overlay category.
///
/// Segments of different categories may overlap in vram; segments of the same
/// category are distinguished by their rom start.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OverlayCategoryName {
    inner: String,
}

impl OverlayCategoryName {
    pub const fn new(name: String) -> Self {
        Self { inner: name }
    }

    pub fn inner(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for OverlayCategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
