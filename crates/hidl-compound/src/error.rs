// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Error types for arena construction, validation and emission.

use crate::types::SourceLocation;
use thiserror::Error;

/// Failures while populating a [`crate::TypeArena`].
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("type `{name}` is already defined")]
    DuplicateType { name: String },
}

/// Structural-definition errors reported by [`crate::validate`].
///
/// Each one is fatal to the compound it names and to nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{location}: field `{field}` of `{compound}` is a vector of interfaces, which cannot be placed in a flat buffer")]
    VectorOfInterfaces {
        compound: String,
        field: String,
        location: SourceLocation,
    },

    #[error("{location}: union `{compound}` cannot contain field `{field}`, which needs an embedded fixup pass")]
    UnionNeedsFixup {
        compound: String,
        field: String,
        location: SourceLocation,
    },

    #[error("{location}: redefinition of field `{field}` in `{compound}` (first defined at {first})")]
    DuplicateField {
        compound: String,
        field: String,
        location: SourceLocation,
        first: SourceLocation,
    },

    #[error("{location}: field `{field}` embeds `{compound}` inside itself by value")]
    ContainsItself {
        compound: String,
        field: String,
        location: SourceLocation,
    },
}

impl ValidationError {
    /// Location of the offending declaration.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::VectorOfInterfaces { location, .. }
            | Self::UnionNeedsFixup { location, .. }
            | Self::DuplicateField { location, .. }
            | Self::ContainsItself { location, .. } => location,
        }
    }

    /// Name of the compound that failed.
    pub fn compound(&self) -> &str {
        match self {
            Self::VectorOfInterfaces { compound, .. }
            | Self::UnionNeedsFixup { compound, .. }
            | Self::DuplicateField { compound, .. }
            | Self::ContainsItself { compound, .. } => compound,
        }
    }
}

/// Backend emission failures.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("`{name}` cannot be represented in the managed backend")]
    NotJavaCompatible { name: String },
}
