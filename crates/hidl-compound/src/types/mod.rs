// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Field type model.
//!
//! Every type lives in a [`TypeArena`] and is addressed by a stable [`TypeId`].
//! References between types (vector elements, nested compounds, forward
//! declarations) are ids, so cyclic graphs need no shared ownership.

mod arena;
mod compound;
mod scalar;

pub use arena::TypeArena;
pub use compound::{CompoundType, NamedReference, SourceLocation, Style};
pub use scalar::ScalarKind;

use std::fmt;

/// Stable index of a type inside its [`TypeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn from_index(index: usize) -> Self {
        #[allow(clippy::expect_used)] // arenas never hold more than u32::MAX types
        let raw = u32::try_from(index).expect("type arena index fits within u32");
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of field type kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Scalar(ScalarKind),
    /// Named enumeration stored as `storage`.
    Enum { name: String, storage: ScalarKind },
    String,
    Vector(TypeId),
    /// Fixed-size array laid out inline.
    Array { element: TypeId, len: usize },
    /// Out-of-line pointer (`ref<T>`), patched by reference resolution.
    Ref(TypeId),
    /// Live interface handle; never relocatable as bytes.
    Interface { name: String },
    Compound(CompoundType),
}

impl TypeKind {
    pub fn is_interface(&self) -> bool {
        matches!(self, Self::Interface { .. })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }

    pub fn as_compound(&self) -> Option<&CompoundType> {
        match self {
            Self::Compound(compound) => Some(compound),
            _ => None,
        }
    }
}
