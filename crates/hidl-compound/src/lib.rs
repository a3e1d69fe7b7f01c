// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Compound-type layout and marshalling generator
//!
//! Given a graph of field types (scalars, strings, vectors, arrays, refs,
//! interface handles and nested structs/unions), this crate:
//! - computes a deterministic, alignment-correct binary layout;
//! - decides whether a compound travels as one flat buffer or field by field;
//! - derives structural facts (equality, Java compatibility, pointers) by a
//!   cycle-safe traversal;
//! - renders C++, Java and test-descriptor source for each compound.
//!
//! # Quick Start
//!
//! ```
//! use hidl_compound::{
//!     validate, MarshalPlan, NamedReference, ScalarKind, SourceLocation, Style, TypeArena,
//! };
//!
//! let mut arena = TypeArena::new();
//! let x = arena.add_scalar(ScalarKind::Int32);
//! let byte = arena.add_scalar(ScalarKind::Uint8);
//! let y = arena.add_vector(byte);
//! let id = arena
//!     .declare_compound("pkg::Packet", Style::Struct, SourceLocation::builtin())
//!     .unwrap();
//! arena.define_fields(
//!     id,
//!     vec![
//!         NamedReference::new("x", x, SourceLocation::builtin()),
//!         NamedReference::new("y", y, SourceLocation::builtin()),
//!         NamedReference::new("z", byte, SourceLocation::builtin()),
//!     ],
//! );
//!
//! validate(&arena, id).unwrap();
//! let plan = MarshalPlan::build(&arena, id);
//! assert_eq!(plan.layout.layout.size, 32);
//! assert!(plan.is_flat() && plan.needs_embedded());
//! ```
//!
//! # Two-phase contract
//!
//! Build the arena, call [`validate`] once per compound, then query layout
//! and emit as often as needed. Queries on a compound that failed validation
//! are a caller bug and panic.

pub mod emit;
pub mod error;
pub mod layout;
pub mod marshal;
pub mod properties;
pub mod types;
pub mod validate;
pub mod visited;

pub use emit::{ClassScope, DescriptorEmitter, ErrorMode, ManagedEmitter, NativeEmitter, SourceWriter};
pub use error::{ArenaError, EmitError, ValidationError};
pub use layout::{alignment_and_size, FieldSlot, Layout, LayoutPlan};
pub use marshal::{FieldAccess, MarshalPlan, Strategy};
pub use properties::TypeFacts;
pub use types::{CompoundType, NamedReference, ScalarKind, SourceLocation, Style, TypeArena, TypeId, TypeKind};
pub use validate::validate;
pub use visited::VisitSet;
