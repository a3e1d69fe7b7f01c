// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Marshalling strategy for one compound.
//!
//! The strategy is chosen once from `contains_interface`:
//!
//! - **Live**: an interface handle is reachable, so the value cannot travel
//!   as bytes. Every field is read/written through its own hooks, in order.
//! - **Flat**: the whole value is one buffer of `layout.size` bytes,
//!   identified by a `(parent handle, parent offset)` pair. Then, relative to
//!   that pair:
//!   1. `embedded`: fields whose contents need a second pass (strings,
//!      vectors, nested compounds holding them);
//!   2. `references`: fields holding out-of-line pointers to patch.
//!
//! Both passes of a field use the offset of the same [`LayoutPlan`] slot, so
//! the emitters never compute a field offset twice.

use crate::layout::{Layout, LayoutPlan};
use crate::properties::{needs_embedded_read_write, needs_resolve_references, TypeFacts};
use crate::types::{TypeArena, TypeId};
use tracing::debug;

/// A field visited by one marshalling pass.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldAccess {
    pub name: String,
    pub type_id: TypeId,
    /// Offset of the field inside the parent buffer.
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "strategy", rename_all = "lowercase"))]
pub enum Strategy {
    Live {
        fields: Vec<FieldAccess>,
    },
    Flat {
        layout: Layout,
        embedded: Vec<FieldAccess>,
        references: Vec<FieldAccess>,
    },
}

/// Everything a backend needs to marshal one compound.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarshalPlan {
    pub type_id: TypeId,
    pub name: String,
    pub facts: TypeFacts,
    pub layout: LayoutPlan,
    pub strategy: Strategy,
}

impl MarshalPlan {
    /// Plan a validated compound.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a compound, or is a union that validation would
    /// have rejected.
    pub fn build(arena: &TypeArena, id: TypeId) -> Self {
        let Some(compound) = arena.compound(id) else {
            panic!("marshal plan requested for non-compound {}", arena.display_name(id));
        };
        assert!(
            !compound.is_union()
                || compound
                    .fields()
                    .iter()
                    .all(|field| !needs_embedded_read_write(arena, field.type_id())),
            "union `{}` must pass validation before planning",
            compound.name()
        );

        let layout = LayoutPlan::of(arena, compound);
        let facts = TypeFacts::derive(arena, id);

        let access = |filter: &dyn Fn(TypeId) -> bool| -> Vec<FieldAccess> {
            layout
                .fields
                .iter()
                .filter(|slot| filter(slot.type_id))
                .map(|slot| FieldAccess {
                    name: slot.name.clone(),
                    type_id: slot.type_id,
                    offset: slot.offset,
                })
                .collect()
        };

        let strategy = if facts.contains_interface {
            Strategy::Live {
                fields: access(&|_| true),
            }
        } else {
            let embedded = if facts.needs_embedded_read_write {
                access(&|field| needs_embedded_read_write(arena, field))
            } else {
                Vec::new()
            };
            let references = if facts.needs_resolve_references {
                access(&|field| needs_resolve_references(arena, field))
            } else {
                Vec::new()
            };
            Strategy::Flat {
                layout: layout.layout,
                embedded,
                references,
            }
        };

        debug!(
            "planned `{}`: {} ({} bytes, align {})",
            compound.name(),
            if facts.contains_interface { "live" } else { "flat" },
            layout.layout.size,
            layout.layout.align
        );

        Self {
            type_id: id,
            name: compound.name().to_string(),
            facts,
            layout,
            strategy,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.strategy, Strategy::Flat { .. })
    }

    /// Fields of the embedded pass (empty on the live path).
    pub fn embedded(&self) -> &[FieldAccess] {
        match &self.strategy {
            Strategy::Flat { embedded, .. } => embedded,
            Strategy::Live { .. } => &[],
        }
    }

    /// Fields of the reference-resolution pass (empty on the live path).
    pub fn references(&self) -> &[FieldAccess] {
        match &self.strategy {
            Strategy::Flat { references, .. } => references,
            Strategy::Live { .. } => &[],
        }
    }

    pub fn needs_embedded(&self) -> bool {
        !self.embedded().is_empty()
    }

    pub fn needs_references(&self) -> bool {
        !self.references().is_empty()
    }
}
