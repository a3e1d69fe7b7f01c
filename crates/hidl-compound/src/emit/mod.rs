// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Backend renderers.
//!
//! Emitters read a [`crate::MarshalPlan`] and the arena and produce source
//! text. They never mutate either, and every backend observes the same facts
//! for the same compound.

pub mod managed;
pub mod native;
pub mod vts;
mod writer;

pub use managed::{ClassScope, ManagedEmitter};
pub use native::NativeEmitter;
pub use vts::DescriptorEmitter;
pub use writer::SourceWriter;

/// How generated native code leaves a function on a non-OK status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ErrorMode {
    /// Jump to a shared `_hidl_error:` label.
    #[default]
    Goto,
    /// Return the status directly.
    Return,
}

impl ErrorMode {
    /// Status check placed after every fallible transport call.
    pub fn check(self, w: &mut SourceWriter) {
        match self {
            Self::Goto => w.line("if (_hidl_err != ::android::OK) { goto _hidl_error; }"),
            Self::Return => w.line("if (_hidl_err != ::android::OK) { return _hidl_err; }"),
        };
    }
}

/// Turn an access expression into a fragment usable inside an identifier.
pub(crate) fn sanitize(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    for c in expr.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_punctuation() {
        assert_eq!(sanitize("obj.inner.items"), "obj_inner_items");
        assert_eq!(sanitize("(*_hidl_ptr)[_hidl_index_0]"), "hidl_ptr_hidl_index_0");
        assert_eq!(sanitize("value"), "value");
    }

    #[test]
    fn error_mode_checks() {
        let mut w = SourceWriter::new();
        ErrorMode::Goto.check(&mut w);
        ErrorMode::Return.check(&mut w);
        assert_eq!(
            w.finish(),
            "if (_hidl_err != ::android::OK) { goto _hidl_error; }\n\
             if (_hidl_err != ::android::OK) { return _hidl_err; }\n"
        );
    }
}
