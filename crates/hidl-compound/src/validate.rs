// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Structural validation of one compound definition.
//!
//! `validate` is the gate in front of every layout and emission query. Checks
//! run in a fixed order and the first failure is returned:
//!
//! 1. no field is a vector of interfaces;
//! 2. a union has no field that needs an embedded fixup pass;
//! 3. field names are unique (the second occurrence is reported);
//! 4. no compound reachable by value contains itself by value, which would
//!    give it an infinite size.

use crate::error::ValidationError;
use crate::properties::{is_vector_of_interfaces, needs_embedded_read_write};
use crate::types::{CompoundType, TypeArena, TypeId, TypeKind};
use crate::visited::VisitSet;
use std::collections::HashMap;
use tracing::debug;

/// Validate the compound `id`.
///
/// # Panics
///
/// Panics if `id` is not a compound.
pub fn validate(arena: &TypeArena, id: TypeId) -> Result<(), ValidationError> {
    let Some(compound) = arena.compound(id) else {
        panic!("validate called on non-compound {}", arena.display_name(id));
    };

    check_vector_of_interfaces(arena, compound)?;
    if compound.is_union() {
        check_union_fixups(arena, compound)?;
    }
    check_unique_names(compound)?;
    check_by_value_cycles(arena, id, compound)?;

    debug!("validated {} `{}`", compound.style(), compound.name());
    Ok(())
}

fn check_vector_of_interfaces(arena: &TypeArena, compound: &CompoundType) -> Result<(), ValidationError> {
    match compound
        .fields()
        .iter()
        .find(|field| is_vector_of_interfaces(arena, field.type_id()))
    {
        Some(field) => Err(ValidationError::VectorOfInterfaces {
            compound: compound.name().to_string(),
            field: field.name().to_string(),
            location: field.location().clone(),
        }),
        None => Ok(()),
    }
}

fn check_union_fixups(arena: &TypeArena, compound: &CompoundType) -> Result<(), ValidationError> {
    match compound
        .fields()
        .iter()
        .find(|field| needs_embedded_read_write(arena, field.type_id()))
    {
        Some(field) => Err(ValidationError::UnionNeedsFixup {
            compound: compound.name().to_string(),
            field: field.name().to_string(),
            location: field.location().clone(),
        }),
        None => Ok(()),
    }
}

fn check_unique_names(compound: &CompoundType) -> Result<(), ValidationError> {
    let mut seen = HashMap::with_capacity(compound.fields().len());
    for field in compound.fields() {
        if let Some(first) = seen.insert(field.name(), field.location()) {
            return Err(ValidationError::DuplicateField {
                compound: compound.name().to_string(),
                field: field.name().to_string(),
                location: field.location().clone(),
                first: first.clone(),
            });
        }
    }
    Ok(())
}

fn check_by_value_cycles(
    arena: &TypeArena,
    id: TypeId,
    compound: &CompoundType,
) -> Result<(), ValidationError> {
    let mut done = VisitSet::with_capacity(arena.len());
    let mut stack = vec![id];
    for field in compound.fields() {
        if let Some(cycle) = find_by_value_cycle(arena, field.type_id(), &mut stack, &mut done) {
            return Err(ValidationError::ContainsItself {
                compound: arena.display_name(cycle),
                field: field.name().to_string(),
                location: field.location().clone(),
            });
        }
    }
    Ok(())
}

/// Depth-first walk over by-value edges (nested compounds, array elements).
/// Returns the compound that closes a cycle, if any.
fn find_by_value_cycle(
    arena: &TypeArena,
    id: TypeId,
    stack: &mut Vec<TypeId>,
    done: &mut VisitSet,
) -> Option<TypeId> {
    match arena.get(id) {
        TypeKind::Array { element, .. } => find_by_value_cycle(arena, *element, stack, done),
        TypeKind::Compound(compound) => {
            if stack.contains(&id) {
                return Some(id);
            }
            if done.contains(id) {
                return None;
            }
            stack.push(id);
            let cycle = compound
                .fields()
                .iter()
                .find_map(|field| find_by_value_cycle(arena, field.type_id(), stack, done));
            stack.pop();
            done.insert(id);
            cycle
        }
        _ => None,
    }
}
