// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Binary layout of field types and compounds.
//!
//! The per-kind rules mirror the in-memory representation the generated
//! native code relies on:
//!
//! | Kind | Align | Size |
//! |------|-------|------|
//! | n-byte scalar / enum storage | n | n |
//! | string, vector (pointer + u32 size + owner flag) | 8 | 16 |
//! | ref, interface handle | 8 | 8 |
//! | `T[n]` | align(T) | n * size(T) |
//! | struct / union | see [`LayoutPlan::compute`] | |
//!
//! Results are pure functions of the arena: calling them twice on the same
//! field list yields the same numbers.

use crate::types::{CompoundType, Style, TypeArena, TypeId, TypeKind};

/// `(alignment, size)` pair in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Layout {
    pub align: usize,
    pub size: usize,
}

impl Layout {
    pub const fn new(align: usize, size: usize) -> Self {
        Self { align, size }
    }

    /// Scalars are aligned to their own width.
    pub const fn natural(width: usize) -> Self {
        Self::new(width, width)
    }
}

/// `hidl_string` / `hidl_vec<T>`: buffer pointer, 32-bit size, ownership flag.
pub const BUFFER_DESCRIPTOR: Layout = Layout::new(8, 16);
/// Offset of the buffer pointer inside [`BUFFER_DESCRIPTOR`].
pub const BUFFER_POINTER_OFFSET: usize = 0;
/// Offset of the element count inside [`BUFFER_DESCRIPTOR`].
pub const BUFFER_SIZE_OFFSET: usize = 8;
/// Offset of the ownership flag inside [`BUFFER_DESCRIPTOR`].
pub const BUFFER_OWNER_OFFSET: usize = 12;
/// Refs and interface handles are a single pointer.
pub const POINTER: Layout = Layout::new(8, 8);

/// Layout of any type in the arena.
///
/// The arena must be free of by-value cycles, which [`crate::validate`]
/// guarantees for every compound that passed it.
pub fn alignment_and_size(arena: &TypeArena, id: TypeId) -> Layout {
    match arena.get(id) {
        TypeKind::Scalar(kind) => Layout::natural(kind.width()),
        TypeKind::Enum { storage, .. } => Layout::natural(storage.width()),
        TypeKind::String | TypeKind::Vector(_) => BUFFER_DESCRIPTOR,
        TypeKind::Ref(_) | TypeKind::Interface { .. } => POINTER,
        TypeKind::Array { element, len } => {
            let element = alignment_and_size(arena, *element);
            Layout::new(element.align, element.size * len)
        }
        TypeKind::Compound(compound) => LayoutPlan::of(arena, compound).layout,
    }
}

/// Placement of one field inside its compound.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldSlot {
    pub name: String,
    pub type_id: TypeId,
    pub offset: usize,
    pub layout: Layout,
}

/// Field offsets plus total alignment and size of one compound.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayoutPlan {
    pub style: Style,
    pub layout: Layout,
    pub fields: Vec<FieldSlot>,
}

impl LayoutPlan {
    /// # Panics
    ///
    /// Panics if `id` is not a compound.
    pub fn compute(arena: &TypeArena, id: TypeId) -> Self {
        match arena.compound(id) {
            Some(compound) => Self::of(arena, compound),
            None => panic!("layout plan requested for non-compound {}", arena.display_name(id)),
        }
    }

    /// Single pass in declaration order.
    ///
    /// Struct fields are placed at the next offset aligned for them; union
    /// members all sit at offset 0 and the widest one sets the size. The
    /// total is padded to the largest field alignment so arrays of the
    /// compound stay aligned, and never drops below one byte.
    pub fn of(arena: &TypeArena, compound: &CompoundType) -> Self {
        let style = compound.style();
        let mut align = 1;
        let mut size = 0;
        let mut offset = 0;
        let mut fields = Vec::with_capacity(compound.fields().len());

        for field in compound.fields() {
            let layout = alignment_and_size(arena, field.type_id());

            let pad = offset % layout.align;
            if pad > 0 {
                offset += layout.align - pad;
            }
            fields.push(FieldSlot {
                name: field.name().to_string(),
                type_id: field.type_id(),
                offset,
                layout,
            });

            match style {
                Style::Struct => offset += layout.size,
                Style::Union => size = size.max(layout.size),
            }
            align = align.max(layout.align);
        }

        if style == Style::Struct {
            size = offset;
        }
        let pad = size % align;
        if pad > 0 {
            size += align - pad;
        }
        if size == 0 {
            size = 1;
        }

        Self {
            style,
            layout: Layout::new(align, size),
            fields,
        }
    }

    pub fn slot(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|slot| slot.name == name)
    }
}
