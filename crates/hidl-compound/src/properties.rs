// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Structural properties derived by traversing the type graph.
//!
//! Compounds may reach themselves again through vectors or refs, so every
//! recursive query carries a [`VisitSet`]. A type met a second time during
//! the same query answers with the property's neutral value instead of
//! recursing: `true` for the "all fields" properties (equality, Java
//! compatibility), `false` for the "any field" ones (pointer, interface,
//! reference resolution). The neutral value can never flip the overall
//! answer, so the result does not depend on where a cycle is entered.
//!
//! The plain functions start a fresh set per call. The `*_in` variants take
//! the caller's set for use inside an enclosing traversal.

use crate::types::{TypeArena, TypeId, TypeKind};
use crate::visited::VisitSet;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Property {
    ResolveReferences,
    Equality,
    Pointer,
    JavaCompatible,
    Interface,
}

impl Property {
    /// Answer for a type already entered by the current query.
    const fn in_progress(self) -> bool {
        match self {
            Self::Equality | Self::JavaCompatible => true,
            Self::ResolveReferences | Self::Pointer | Self::Interface => false,
        }
    }
}

fn derive(arena: &TypeArena, id: TypeId, property: Property, visited: &mut VisitSet) -> bool {
    let kind = arena.get(id);

    // Union policy is unconditional and must not depend on visit order.
    if let TypeKind::Compound(compound) = kind {
        if compound.is_union() {
            match property {
                Property::Equality | Property::JavaCompatible | Property::ResolveReferences => {
                    return false;
                }
                Property::Pointer | Property::Interface => {}
            }
        }
    }

    if !visited.insert(id) {
        return property.in_progress();
    }

    match kind {
        TypeKind::Scalar(_) | TypeKind::Enum { .. } | TypeKind::String => match property {
            Property::Equality | Property::JavaCompatible => true,
            Property::ResolveReferences | Property::Pointer | Property::Interface => false,
        },
        TypeKind::Interface { .. } => match property {
            Property::Equality | Property::JavaCompatible | Property::Interface => true,
            Property::ResolveReferences | Property::Pointer => false,
        },
        TypeKind::Vector(element) | TypeKind::Array { element, .. } => {
            derive(arena, *element, property, visited)
        }
        TypeKind::Ref(target) => match property {
            Property::ResolveReferences | Property::Pointer => true,
            Property::Equality | Property::JavaCompatible => false,
            Property::Interface => derive(arena, *target, property, visited),
        },
        TypeKind::Compound(compound) => {
            let mut fields = compound.fields().iter();
            match property {
                Property::Equality | Property::JavaCompatible => {
                    fields.all(|field| derive(arena, field.type_id(), property, visited))
                }
                Property::ResolveReferences | Property::Pointer | Property::Interface => {
                    fields.any(|field| derive(arena, field.type_id(), property, visited))
                }
            }
        }
    }
}

fn fresh(arena: &TypeArena) -> VisitSet {
    VisitSet::with_capacity(arena.len())
}

/// Whether a value of this type needs a second pass inside an already
/// materialised flat buffer (strings, vectors, and anything containing them).
///
/// Only by-value containment is followed; vectors answer `true` without
/// looking at their element. Unions always answer `false`, and validation
/// rejects unions whose members would need the pass.
pub fn needs_embedded_read_write(arena: &TypeArena, id: TypeId) -> bool {
    needs_embedded_read_write_in(arena, id, &mut fresh(arena))
}

/// By-value cycles only exist in arenas that have not been validated yet;
/// the set keeps the walk finite for them.
pub fn needs_embedded_read_write_in(arena: &TypeArena, id: TypeId, visited: &mut VisitSet) -> bool {
    match arena.get(id) {
        TypeKind::String | TypeKind::Vector(_) => true,
        TypeKind::Array { element, .. } => needs_embedded_read_write_in(arena, *element, visited),
        TypeKind::Compound(compound) => {
            if compound.is_union() || !visited.insert(id) {
                return false;
            }
            compound
                .fields()
                .iter()
                .any(|field| needs_embedded_read_write_in(arena, field.type_id(), visited))
        }
        TypeKind::Scalar(_) | TypeKind::Enum { .. } | TypeKind::Ref(_) | TypeKind::Interface { .. } => {
            false
        }
    }
}

pub fn needs_resolve_references(arena: &TypeArena, id: TypeId) -> bool {
    needs_resolve_references_in(arena, id, &mut fresh(arena))
}

pub fn needs_resolve_references_in(arena: &TypeArena, id: TypeId, visited: &mut VisitSet) -> bool {
    derive(arena, id, Property::ResolveReferences, visited)
}

/// Deep equality support. Never true for a union.
pub fn can_check_equality(arena: &TypeArena, id: TypeId) -> bool {
    can_check_equality_in(arena, id, &mut fresh(arena))
}

pub fn can_check_equality_in(arena: &TypeArena, id: TypeId, visited: &mut VisitSet) -> bool {
    derive(arena, id, Property::Equality, visited)
}

pub fn contains_pointer(arena: &TypeArena, id: TypeId) -> bool {
    contains_pointer_in(arena, id, &mut fresh(arena))
}

pub fn contains_pointer_in(arena: &TypeArena, id: TypeId, visited: &mut VisitSet) -> bool {
    derive(arena, id, Property::Pointer, visited)
}

/// Whether the managed backend can represent the type. Never true for a union.
pub fn is_java_compatible(arena: &TypeArena, id: TypeId) -> bool {
    is_java_compatible_in(arena, id, &mut fresh(arena))
}

pub fn is_java_compatible_in(arena: &TypeArena, id: TypeId, visited: &mut VisitSet) -> bool {
    derive(arena, id, Property::JavaCompatible, visited)
}

/// Whether an interface handle is reachable anywhere inside the type.
pub fn contains_interface(arena: &TypeArena, id: TypeId) -> bool {
    contains_interface_in(arena, id, &mut fresh(arena))
}

pub fn contains_interface_in(arena: &TypeArena, id: TypeId, visited: &mut VisitSet) -> bool {
    derive(arena, id, Property::Interface, visited)
}

pub fn is_interface(arena: &TypeArena, id: TypeId) -> bool {
    arena.get(id).is_interface()
}

/// A vector or ref, possibly behind fixed-size arrays, whose contents hold
/// interface handles. Handles cannot travel inside a buffer, so no backend
/// has marshalling code for such a field.
pub fn buffers_interface(arena: &TypeArena, id: TypeId) -> bool {
    match arena.get(id) {
        TypeKind::Array { element, .. } => buffers_interface(arena, *element),
        TypeKind::Vector(inner) | TypeKind::Ref(inner) => contains_interface(arena, *inner),
        _ => false,
    }
}

/// `vec<I>` where `I` is an interface.
pub fn is_vector_of_interfaces(arena: &TypeArena, id: TypeId) -> bool {
    match arena.get(id) {
        TypeKind::Vector(element) => is_interface(arena, *element),
        _ => false,
    }
}

/// Every derived fact about one type, each computed by its own query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeFacts {
    pub needs_embedded_read_write: bool,
    pub needs_resolve_references: bool,
    pub can_check_equality: bool,
    pub is_java_compatible: bool,
    pub contains_pointer: bool,
    pub contains_interface: bool,
}

impl TypeFacts {
    pub fn derive(arena: &TypeArena, id: TypeId) -> Self {
        let facts = Self {
            needs_embedded_read_write: needs_embedded_read_write(arena, id),
            needs_resolve_references: needs_resolve_references(arena, id),
            can_check_equality: can_check_equality(arena, id),
            is_java_compatible: is_java_compatible(arena, id),
            contains_pointer: contains_pointer(arena, id),
            contains_interface: contains_interface(arena, id),
        };
        debug!("derived facts for {}: {:?}", arena.display_name(id), facts);
        facts
    }
}
