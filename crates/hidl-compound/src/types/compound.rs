// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Struct/union definitions and their named fields.

use super::TypeId;
use std::fmt;
use std::sync::Arc;

/// Whether a compound lays its fields out sequentially or overlays them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Style {
    Struct,
    Union,
}

impl Style {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Position of a declaration in its source file, for diagnostics only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location for types synthesised without a source file.
    pub fn builtin() -> Self {
        Self::new("<builtin>", 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One field: a name bound to a type in the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedReference {
    name: String,
    type_id: TypeId,
    location: SourceLocation,
}

impl NamedReference {
    pub fn new(name: impl Into<String>, type_id: TypeId, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            type_id,
            location,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }
}

/// A struct or union definition.
///
/// `fields` keeps declaration order; for structs it is also the layout and
/// wire order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundType {
    name: String,
    style: Style,
    fields: Vec<NamedReference>,
    location: SourceLocation,
}

impl CompoundType {
    pub(crate) fn new(name: String, style: Style, location: SourceLocation) -> Self {
        Self {
            name,
            style,
            fields: Vec::new(),
            location,
        }
    }

    /// Fully-qualified name (`pkg::Outer::Inner`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last path segment of [`Self::name`].
    pub fn local_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn is_union(&self) -> bool {
        self.style == Style::Union
    }

    pub fn fields(&self) -> &[NamedReference] {
        &self.fields
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub(crate) fn set_fields(&mut self, fields: Vec<NamedReference>) {
        self.fields = fields;
    }
}
