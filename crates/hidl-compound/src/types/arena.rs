// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Arena holding every type of one compilation.
//!
//! Construction is two-phase so that forward references work: compounds are
//! first declared (name + style, no fields), which hands out their id, and
//! are given fields later with [`TypeArena::define_fields`]. After the front
//! end is done the arena is only read.

use super::{CompoundType, NamedReference, ScalarKind, SourceLocation, Style, TypeId, TypeKind};
use crate::error::ArenaError;
use std::collections::HashMap;

/// Owner of all types; ids index into `types`.
#[derive(Clone, Debug, Default)]
pub struct TypeArena {
    types: Vec<TypeKind>,
    named: HashMap<String, TypeId>,
    scalars: HashMap<ScalarKind, TypeId>,
    string: Option<TypeId>,
}

impl TypeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(kind);
        id
    }

    fn push_named(&mut self, name: &str, kind: TypeKind) -> Result<TypeId, ArenaError> {
        if self.named.contains_key(name) {
            return Err(ArenaError::DuplicateType {
                name: name.to_string(),
            });
        }
        let id = self.push(kind);
        self.named.insert(name.to_string(), id);
        Ok(id)
    }

    /// Scalars are interned: one id per kind.
    pub fn add_scalar(&mut self, kind: ScalarKind) -> TypeId {
        if let Some(id) = self.scalars.get(&kind) {
            return *id;
        }
        let id = self.push(TypeKind::Scalar(kind));
        self.scalars.insert(kind, id);
        id
    }

    pub fn add_string(&mut self) -> TypeId {
        if let Some(id) = self.string {
            return id;
        }
        let id = self.push(TypeKind::String);
        self.string = Some(id);
        id
    }

    pub fn add_vector(&mut self, element: TypeId) -> TypeId {
        self.push(TypeKind::Vector(element))
    }

    pub fn add_array(&mut self, element: TypeId, len: usize) -> TypeId {
        self.push(TypeKind::Array { element, len })
    }

    pub fn add_ref(&mut self, target: TypeId) -> TypeId {
        self.push(TypeKind::Ref(target))
    }

    pub fn add_interface(&mut self, name: &str) -> Result<TypeId, ArenaError> {
        self.push_named(
            name,
            TypeKind::Interface {
                name: name.to_string(),
            },
        )
    }

    pub fn add_enum(&mut self, name: &str, storage: ScalarKind) -> Result<TypeId, ArenaError> {
        self.push_named(
            name,
            TypeKind::Enum {
                name: name.to_string(),
                storage,
            },
        )
    }

    /// Declare a compound without fields. The returned id may be referenced
    /// before [`Self::define_fields`] is called, which is how cycles are built.
    pub fn declare_compound(
        &mut self,
        name: &str,
        style: Style,
        location: SourceLocation,
    ) -> Result<TypeId, ArenaError> {
        self.push_named(
            name,
            TypeKind::Compound(CompoundType::new(name.to_string(), style, location)),
        )
    }

    /// Attach the field list of a declared compound.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a compound or a field refers outside the arena.
    pub fn define_fields(&mut self, id: TypeId, fields: Vec<NamedReference>) {
        let len = self.types.len();
        assert!(
            fields.iter().all(|field| field.type_id().index() < len),
            "field type id outside of arena"
        );
        match &mut self.types[id.index()] {
            TypeKind::Compound(compound) => compound.set_fields(fields),
            other => panic!("define_fields on non-compound type {other:?}"),
        }
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this arena.
    pub fn get(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()]
    }

    pub fn compound(&self, id: TypeId) -> Option<&CompoundType> {
        self.get(id).as_compound()
    }

    /// Find a named type (compound, enum or interface) by fully-qualified name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.named.get(name).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len()).map(TypeId::from_index)
    }

    /// Compounds in declaration order.
    pub fn compound_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.ids().filter(|id| self.compound(*id).is_some())
    }

    /// IDL spelling of a type, for diagnostics and descriptors.
    pub fn display_name(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeKind::Scalar(kind) => kind.keyword().to_string(),
            TypeKind::String => "string".to_string(),
            TypeKind::Vector(element) => format!("vec<{}>", self.display_name(*element)),
            TypeKind::Array { element, len } => {
                format!("{}[{len}]", self.display_name(*element))
            }
            TypeKind::Ref(target) => format!("ref<{}>", self.display_name(*target)),
            TypeKind::Enum { name, .. } | TypeKind::Interface { name } => name.clone(),
            TypeKind::Compound(compound) => compound.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_and_string_are_interned() {
        let mut arena = TypeArena::new();
        let a = arena.add_scalar(ScalarKind::Int32);
        let b = arena.add_scalar(ScalarKind::Int32);
        let s1 = arena.add_string();
        let s2 = arena.add_string();
        assert_eq!(a, b);
        assert_eq!(s1, s2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn forward_declared_compound_can_reference_itself() {
        let mut arena = TypeArena::new();
        let node = arena
            .declare_compound("pkg::Node", Style::Struct, SourceLocation::builtin())
            .expect("declare");
        let next = arena.add_vector(node);
        arena.define_fields(
            node,
            vec![NamedReference::new("next", next, SourceLocation::builtin())],
        );

        let compound = arena.compound(node).expect("compound");
        assert_eq!(compound.fields().len(), 1);
        assert_eq!(compound.local_name(), "Node");
        assert_eq!(arena.display_name(next), "vec<pkg::Node>");
        assert_eq!(arena.lookup("pkg::Node"), Some(node));
    }

    #[test]
    fn duplicate_named_type_is_rejected() {
        let mut arena = TypeArena::new();
        arena.add_interface("pkg::IFoo").expect("first");
        let err = arena
            .declare_compound("pkg::IFoo", Style::Union, SourceLocation::builtin())
            .unwrap_err();
        assert!(matches!(err, ArenaError::DuplicateType { ref name } if name == "pkg::IFoo"));
    }

    #[test]
    #[should_panic(expected = "non-compound")]
    fn define_fields_on_scalar_panics() {
        let mut arena = TypeArena::new();
        let id = arena.add_scalar(ScalarKind::Bool);
        arena.define_fields(id, Vec::new());
    }
}
