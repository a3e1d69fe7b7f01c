// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Randomized layout invariants over generated field lists.

use hidl_compound::{
    alignment_and_size, validate, LayoutPlan, NamedReference, ScalarKind, SourceLocation, Style, TypeArena, TypeId,
};

const SCALARS: [ScalarKind; 11] = [
    ScalarKind::Bool,
    ScalarKind::Int8,
    ScalarKind::Uint8,
    ScalarKind::Int16,
    ScalarKind::Uint16,
    ScalarKind::Int32,
    ScalarKind::Uint32,
    ScalarKind::Int64,
    ScalarKind::Uint64,
    ScalarKind::Float,
    ScalarKind::Double,
];

/// A random field type built only from types already in the arena.
fn random_type(arena: &mut TypeArena, rng: &mut fastrand::Rng, compounds: &[TypeId]) -> TypeId {
    match rng.u8(..6) {
        0 | 1 => arena.add_scalar(SCALARS[rng.usize(..SCALARS.len())]),
        2 => arena.add_string(),
        3 => {
            let element = arena.add_scalar(SCALARS[rng.usize(..SCALARS.len())]);
            arena.add_vector(element)
        }
        4 => {
            let element = arena.add_scalar(SCALARS[rng.usize(..SCALARS.len())]);
            arena.add_array(element, rng.usize(1..5))
        }
        _ if !compounds.is_empty() => compounds[rng.usize(..compounds.len())],
        _ => arena.add_scalar(ScalarKind::Uint8),
    }
}

fn random_compound(
    arena: &mut TypeArena,
    rng: &mut fastrand::Rng,
    index: usize,
    style: Style,
    compounds: &[TypeId],
) -> TypeId {
    let id = arena
        .declare_compound(&format!("pkg::T{index}"), style, SourceLocation::builtin())
        .expect("unique name");
    let count = rng.usize(0..8);
    let fields = (0..count)
        .map(|n| {
            let ty = random_type(arena, rng, compounds);
            NamedReference::new(format!("f{n}"), ty, SourceLocation::builtin())
        })
        .collect();
    arena.define_fields(id, fields);
    id
}

#[test]
fn size_is_nonzero_multiple_of_alignment() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..50 {
        let mut arena = TypeArena::new();
        let mut compounds = Vec::new();
        for index in 0..6 {
            let id = random_compound(&mut arena, &mut rng, index, Style::Struct, &compounds);
            compounds.push(id);

            let layout = alignment_and_size(&arena, id);
            assert!(layout.size >= 1);
            assert_eq!(layout.size % layout.align, 0, "{}", arena.display_name(id));
        }
    }
}

#[test]
fn struct_offsets_are_cumulative_and_deterministic() {
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..50 {
        let mut arena = TypeArena::new();
        let mut compounds = Vec::new();
        for index in 0..4 {
            let id = random_compound(&mut arena, &mut rng, index, Style::Struct, &compounds);
            compounds.push(id);
            validate(&arena, id).expect("acyclic struct");

            let first = LayoutPlan::compute(&arena, id);
            let second = LayoutPlan::compute(&arena, id);
            assert_eq!(first, second);

            let mut cursor = 0;
            for slot in &first.fields {
                let pad = (slot.layout.align - cursor % slot.layout.align) % slot.layout.align;
                assert_eq!(slot.offset, cursor + pad);
                cursor = slot.offset + slot.layout.size;
            }
            assert!(first.layout.size >= cursor);
        }
    }
}

#[test]
fn union_size_is_widest_member_padded() {
    let mut rng = fastrand::Rng::with_seed(7);
    for index in 0..100 {
        let mut arena = TypeArena::new();
        let id = random_compound(&mut arena, &mut rng, index, Style::Union, &[]);
        let plan = LayoutPlan::compute(&arena, id);

        let widest = plan.fields.iter().map(|slot| slot.layout.size).max().unwrap_or(0);
        let align = plan.layout.align;
        let padded = ((widest + align - 1) / align * align).max(1);
        assert_eq!(plan.layout.size, padded);
        assert!(plan.fields.iter().all(|slot| slot.offset == 0));
    }
}
