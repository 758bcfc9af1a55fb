/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;

/// Names of the label macros the generated assembly expects the build system
/// to provide.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct MacroLabels {
    func: String,
    jtbl_label: String,
    data: String,
}

impl MacroLabels {
    pub fn new() -> Self {
        Self {
            func: "glabel".into(),
            jtbl_label: "jlabel".into(),
            data: "dlabel".into(),
        }
    }

    pub fn func(&self) -> &str {
        &self.func
    }
    pub fn with_func(self, func: String) -> Self {
        Self { func, ..self }
    }

    pub fn jtbl_label(&self) -> &str {
        &self.jtbl_label
    }
    pub fn with_jtbl_label(self, jtbl_label: String) -> Self {
        Self { jtbl_label, ..self }
    }

    pub fn data(&self) -> &str {
        &self.data
    }
    pub fn with_data(self, data: String) -> Self {
        Self { data, ..self }
    }
}

impl Default for MacroLabels {
    fn default() -> Self {
        Self::new()
    }
}
