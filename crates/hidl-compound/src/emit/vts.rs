// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Declarative descriptor consumed by the conformance-test tooling.

use super::native::qualified;
use super::SourceWriter;
use crate::marshal::MarshalPlan;
use crate::types::{Style, TypeArena, TypeId, TypeKind};

fn style_tag(style: Style) -> (&'static str, &'static str) {
    match style {
        Style::Struct => ("TYPE_STRUCT", "struct_value"),
        Style::Union => ("TYPE_UNION", "union_value"),
    }
}

pub struct DescriptorEmitter<'a> {
    arena: &'a TypeArena,
}

impl<'a> DescriptorEmitter<'a> {
    pub fn new(arena: &'a TypeArena) -> Self {
        Self { arena }
    }

    /// Top-level `attribute` block for one compound.
    pub fn emit_attribute(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        w.block("attribute: {", "}", |w| {
            self.emit_compound_body(w, &plan.name, plan.layout.style, plan.type_id);
        });
    }

    fn emit_compound_body(&self, w: &mut SourceWriter, name: &str, style: Style, id: TypeId) {
        let (tag, member) = style_tag(style);
        w.line(format!("name: \"{}\"", qualified(name)));
        w.line(format!("type: {tag}"));
        let Some(compound) = self.arena.compound(id) else {
            return;
        };
        for field in compound.fields() {
            w.block(format!("{member}: {{"), "}", |w| {
                w.line(format!("name: \"{}\"", field.name()));
                self.emit_field_type(w, field.type_id());
            });
        }
    }

    /// `type:` line plus the kind-specific payload of one field type.
    pub fn emit_field_type(&self, w: &mut SourceWriter, id: TypeId) {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) => {
                w.line("type: TYPE_SCALAR");
                w.line(format!("scalar_type: \"{}\"", kind.descriptor_name()));
            }
            TypeKind::Enum { name, .. } => {
                w.line("type: TYPE_ENUM");
                w.line(format!("predefined_type: \"{}\"", qualified(name)));
            }
            TypeKind::String => {
                w.line("type: TYPE_STRING");
            }
            TypeKind::Vector(element) => {
                w.line("type: TYPE_VECTOR");
                w.block("vector_value: {", "}", |w| self.emit_field_type(w, *element));
            }
            TypeKind::Array { element, len } => {
                w.line("type: TYPE_ARRAY");
                w.line(format!("vector_size: {len}"));
                w.block("vector_value: {", "}", |w| self.emit_field_type(w, *element));
            }
            TypeKind::Ref(target) => {
                w.line("type: TYPE_REF");
                w.block("ref_value: {", "}", |w| self.emit_field_type(w, *target));
            }
            TypeKind::Interface { name } => {
                w.line("type: TYPE_HIDL_INTERFACE");
                w.line(format!("predefined_type: \"{}\"", qualified(name)));
            }
            TypeKind::Compound(compound) => {
                let (tag, _) = style_tag(compound.style());
                w.line(format!("type: {tag}"));
                w.line(format!("predefined_type: \"{}\"", qualified(compound.name())));
            }
        }
    }
}
