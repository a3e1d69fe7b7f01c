// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Java backend.
//!
//! Java has no struct overlay, so the flat path copies every field in and
//! out of an `HwBlob` of the compound's size at the offsets of its
//! [`LayoutPlan`](crate::LayoutPlan). Variable-length contents go into child
//! blobs registered against the parent blob, mirroring the native embedded
//! pass. Refs are never Java-compatible, so there is no reference pass here.

use super::SourceWriter;
use crate::error::EmitError;
use crate::layout::{alignment_and_size, BUFFER_DESCRIPTOR, BUFFER_OWNER_OFFSET, BUFFER_POINTER_OFFSET, BUFFER_SIZE_OFFSET};
use crate::marshal::{MarshalPlan, Strategy};
use crate::properties::contains_interface;
use crate::types::{TypeArena, TypeId, TypeKind};

/// Where the generated class lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassScope {
    /// Own compilation unit: `public final class`.
    TopLevel,
    /// Member of an enclosing class: `public final static class`.
    Nested,
}

/// `pkg::Foo` -> `pkg.Foo`.
pub fn dotted(name: &str) -> String {
    name.replace("::", ".")
}

pub struct ManagedEmitter<'a> {
    arena: &'a TypeArena,
}

impl<'a> ManagedEmitter<'a> {
    pub fn new(arena: &'a TypeArena) -> Self {
        Self { arena }
    }

    /// Java spelling of a field type. `boxed` selects the generic-argument
    /// form for primitives.
    pub fn type_name(&self, id: TypeId, boxed: bool) -> String {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) if boxed => kind.managed_boxed_name().to_string(),
            TypeKind::Scalar(kind) => kind.managed_name().to_string(),
            TypeKind::Enum { storage, .. } if boxed => storage.managed_boxed_name().to_string(),
            TypeKind::Enum { storage, .. } => storage.managed_name().to_string(),
            TypeKind::String => "String".to_string(),
            TypeKind::Vector(element) => {
                format!("java.util.ArrayList<{}>", self.type_name(*element, true))
            }
            TypeKind::Array { element, .. } => format!("{}[]", self.type_name(*element, false)),
            TypeKind::Interface { name } => dotted(name),
            TypeKind::Compound(compound) => dotted(compound.name()),
            // Not Java-compatible; rejected before emission.
            TypeKind::Ref(target) => self.type_name(*target, boxed),
        }
    }

    /// Innermost element and dimensions of a (possibly nested) array.
    fn array_shape(&self, id: TypeId) -> (TypeId, Vec<usize>) {
        let mut dims = Vec::new();
        let mut current = id;
        while let TypeKind::Array { element, len } = self.arena.get(current) {
            dims.push(*len);
            current = *element;
        }
        (current, dims)
    }

    /// Whether a value of this type must be allocated before it can be read
    /// into.
    fn is_object(&self, id: TypeId) -> bool {
        matches!(
            self.arena.get(id),
            TypeKind::String | TypeKind::Vector(_) | TypeKind::Compound(_)
        )
    }

    /// Initial value for a fresh field or local.
    fn default_value(&self, id: TypeId) -> String {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) => kind.managed_default().to_string(),
            TypeKind::Enum { storage, .. } => storage.managed_default().to_string(),
            TypeKind::String => "new String()".to_string(),
            TypeKind::Vector(_) => format!("new {}()", self.type_name(id, false)),
            TypeKind::Array { .. } => {
                let (base, dims) = self.array_shape(id);
                // Generic array creation is illegal; allocate the raw type.
                let raw = match self.arena.get(base) {
                    TypeKind::Vector(_) => "java.util.ArrayList".to_string(),
                    _ => self.type_name(base, false),
                };
                let dims: String = dims.iter().map(|len| format!("[{len}]")).collect();
                format!("new {raw}{dims}")
            }
            TypeKind::Compound(compound) => format!("new {}()", dotted(compound.name())),
            TypeKind::Interface { .. } | TypeKind::Ref(_) => "null".to_string(),
        }
    }

    fn size_of(&self, id: TypeId) -> usize {
        alignment_and_size(self.arena, id).size
    }

    /// The whole class for one compound.
    ///
    /// # Panics
    ///
    /// Panics if a field is a vector or ref holding interface handles
    /// (see [`crate::properties::buffers_interface`]).
    pub fn emit_class(
        &self,
        w: &mut SourceWriter,
        plan: &MarshalPlan,
        scope: ClassScope,
    ) -> Result<(), EmitError> {
        if !plan.facts.is_java_compatible {
            return Err(EmitError::NotJavaCompatible {
                name: plan.name.clone(),
            });
        }
        let local = plan.name.rsplit("::").next().unwrap_or(&plan.name);
        let header = match scope {
            ClassScope::TopLevel => format!("public final class {local} {{"),
            ClassScope::Nested => format!("public final static class {local} {{"),
        };

        w.line(header);
        w.indent();
        self.emit_fields(w, plan);
        w.blank();
        self.emit_equals_and_hash(w, plan);
        w.blank();
        self.emit_to_string(w, plan);
        w.blank();
        match &plan.strategy {
            Strategy::Live { .. } => self.emit_live_methods(w, plan),
            Strategy::Flat { .. } => self.emit_flat_methods(w, plan),
        }
        w.unindent();
        w.line("};");
        Ok(())
    }

    fn emit_fields(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        let mut fills = Vec::new();
        for slot in &plan.layout.fields {
            let ty = self.type_name(slot.type_id, false);
            let init = self.default_value(slot.type_id);
            if matches!(self.arena.get(slot.type_id), TypeKind::Array { .. }) {
                w.line(format!("public final {ty} {} = {init};", slot.name));
                let (base, dims) = self.array_shape(slot.type_id);
                if self.is_object(base) {
                    fills.push((slot.name.as_str(), base, dims));
                }
            } else {
                w.line(format!("public {ty} {} = {init};", slot.name));
            }
        }

        // Object arrays start out full of nulls.
        if fills.is_empty() {
            return;
        }
        w.blank();
        w.block("{", "}", |w| {
            for (name, base, dims) in &fills {
                self.emit_fill(w, &format!("this.{name}"), *base, dims, 0);
            }
        });
    }

    fn emit_fill(&self, w: &mut SourceWriter, target: &str, base: TypeId, dims: &[usize], depth: usize) {
        let Some((len, rest)) = dims.split_first() else {
            w.line(format!("{target} = {};", self.default_value(base)));
            return;
        };
        let index = format!("_hidl_index_{depth}");
        w.block(
            format!("for (int {index} = 0; {index} < {len}; ++{index}) {{"),
            "}",
            |w| self.emit_fill(w, &format!("{target}[{index}]"), base, rest, depth + 1),
        );
    }

    /// `equals`/`hashCode` over every field, or a comment stating that they
    /// are deliberately absent.
    pub fn emit_equals_and_hash(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        let fq = dotted(&plan.name);
        if !plan.facts.can_check_equality {
            w.line(format!("// equals() and hashCode() are not generated for {fq}"));
            return;
        }

        w.line("@Override");
        w.block("public final boolean equals(Object otherObject) {", "}", |w| {
            w.block("if (this == otherObject) {", "}", |w| {
                w.line("return true;");
            });
            w.block("if (otherObject == null) {", "}", |w| {
                w.line("return false;");
            });
            w.block(format!("if (otherObject.getClass() != {fq}.class) {{"), "}", |w| {
                w.line("return false;");
            });
            w.line(format!("{fq} other = ({fq})otherObject;"));
            for slot in &plan.layout.fields {
                w.block(
                    format!(
                        "if (!android.os.HidlSupport.deepEquals(this.{0}, other.{0})) {{",
                        slot.name
                    ),
                    "}",
                    |w| {
                        w.line("return false;");
                    },
                );
            }
            w.line("return true;");
        });
        w.blank();

        w.line("@Override");
        w.block("public final int hashCode() {", "}", |w| {
            if plan.layout.fields.is_empty() {
                w.line("return 0;");
                return;
            }
            let hashes: Vec<String> = plan
                .layout
                .fields
                .iter()
                .map(|slot| format!("android.os.HidlSupport.deepHashCode(this.{})", slot.name))
                .collect();
            w.line(format!(
                "return java.util.Objects.hash(\n        {});",
                hashes.join(",\n        ")
            ));
        });
    }

    pub fn emit_to_string(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        w.line("@Override");
        w.block("public final String toString() {", "}", |w| {
            w.line("java.lang.StringBuilder builder = new java.lang.StringBuilder();");
            w.line("builder.append(\"{\");");
            for (index, slot) in plan.layout.fields.iter().enumerate() {
                let sep = if index == 0 { "" } else { ", " };
                w.line(format!("builder.append(\"{sep}.{} = \");", slot.name));
                let value = match self.arena.get(slot.type_id) {
                    TypeKind::Array { .. } => format!("java.util.Arrays.deepToString(this.{})", slot.name),
                    _ => format!("this.{}", slot.name),
                };
                w.line(format!("builder.append({value});"));
            }
            w.line("builder.append(\"}\");");
            w.line("return builder.toString();");
        });
    }

    // ----------------------------------------------------------------------
    // Live path
    // ----------------------------------------------------------------------

    fn emit_live_methods(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        w.block(
            "public final void readFromParcel(android.os.HwParcel parcel) {",
            "}",
            |w| {
                for slot in &plan.layout.fields {
                    self.live_field(w, slot.type_id, &slot.name, true, 0);
                }
            },
        );
        w.blank();
        w.block(
            "public final void writeToParcel(android.os.HwParcel parcel) {",
            "}",
            |w| {
                for slot in &plan.layout.fields {
                    self.live_field(w, slot.type_id, &slot.name, false, 0);
                }
            },
        );
    }

    fn live_field(&self, w: &mut SourceWriter, id: TypeId, target: &str, is_reader: bool, depth: usize) {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) => {
                let suffix = kind.managed_suffix();
                if is_reader {
                    w.line(format!("{target} = parcel.read{suffix}();"));
                } else {
                    w.line(format!("parcel.write{suffix}({target});"));
                }
            }
            TypeKind::Enum { storage, .. } => {
                let suffix = storage.managed_suffix();
                if is_reader {
                    w.line(format!("{target} = parcel.read{suffix}();"));
                } else {
                    w.line(format!("parcel.write{suffix}({target});"));
                }
            }
            TypeKind::String => {
                if is_reader {
                    w.line(format!("{target} = parcel.readString();"));
                } else {
                    w.line(format!("parcel.writeString({target});"));
                }
            }
            TypeKind::Interface { name } => {
                if is_reader {
                    w.line(format!(
                        "{target} = {}.asInterface(parcel.readStrongBinder());",
                        dotted(name)
                    ));
                } else {
                    w.line(format!(
                        "parcel.writeStrongBinder({target} == null ? null : {target}.asBinder());"
                    ));
                }
            }
            TypeKind::Compound(_) => {
                if is_reader {
                    w.line(format!("{target}.readFromParcel(parcel);"));
                } else {
                    w.line(format!("{target}.writeToParcel(parcel);"));
                }
            }
            TypeKind::Array { element, len } if contains_interface(self.arena, *element) => {
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (int {index} = 0; {index} < {len}; ++{index}) {{"),
                    "}",
                    |w| self.live_field(w, *element, &format!("{target}[{index}]"), is_reader, depth + 1),
                );
            }
            _ if contains_interface(self.arena, id) => {
                panic!("{} carries interface handles inside a buffer", self.arena.display_name(id));
            }
            TypeKind::Vector(_) | TypeKind::Array { .. } | TypeKind::Ref(_) => {
                let size = self.size_of(id);
                w.block("{", "}", |w| {
                    if is_reader {
                        w.line(format!(
                            "android.os.HwBlob _hidl_blob = parcel.readBuffer({size} /* size */);"
                        ));
                        self.read_embedded(w, id, target, "_hidl_blob", "0 /* parentOffset */", 0);
                    } else {
                        w.line(format!(
                            "android.os.HwBlob _hidl_blob = new android.os.HwBlob({size} /* size */);"
                        ));
                        self.write_embedded(w, id, target, "_hidl_blob", "0 /* parentOffset */", 0);
                        w.line("parcel.writeBuffer(_hidl_blob);");
                    }
                });
            }
        }
    }

    // ----------------------------------------------------------------------
    // Flat path
    // ----------------------------------------------------------------------

    fn emit_flat_methods(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        let fq = dotted(&plan.name);
        let size = plan.layout.layout.size;
        let descriptor = BUFFER_DESCRIPTOR.size;

        w.block(
            "public final void readFromParcel(android.os.HwParcel parcel) {",
            "}",
            |w| {
                w.line(format!(
                    "android.os.HwBlob blob = parcel.readBuffer({size} /* size */);"
                ));
                w.line("readEmbeddedFromParcel(parcel, blob, 0 /* parentOffset */);");
            },
        );
        w.blank();

        w.block(
            format!(
                "public static final java.util.ArrayList<{fq}> readVectorFromParcel(android.os.HwParcel parcel) {{"
            ),
            "}",
            |w| {
                w.line(format!(
                    "java.util.ArrayList<{fq}> _hidl_vec = new java.util.ArrayList();"
                ));
                w.line(format!(
                    "android.os.HwBlob _hidl_blob = parcel.readBuffer({descriptor} /* sizeof hidl_vec<T> */);"
                ));
                w.blank();
                self.read_vector(w, plan.type_id, "_hidl_vec", "_hidl_blob", "0", 0);
                w.blank();
                w.line("return _hidl_vec;");
            },
        );
        w.blank();

        w.line("public final void readEmbeddedFromParcel(");
        w.block(
            "        android.os.HwParcel parcel, android.os.HwBlob _hidl_blob, long _hidl_offset) {",
            "}",
            |w| {
                for slot in &plan.layout.fields {
                    let offset = format!("_hidl_offset + {}", slot.offset);
                    self.read_embedded(w, slot.type_id, &slot.name, "_hidl_blob", &offset, 0);
                }
            },
        );
        w.blank();

        w.block(
            "public final void writeToParcel(android.os.HwParcel parcel) {",
            "}",
            |w| {
                w.line(format!(
                    "android.os.HwBlob _hidl_blob = new android.os.HwBlob({size} /* size */);"
                ));
                w.line("writeEmbeddedToBlob(_hidl_blob, 0 /* parentOffset */);");
                w.line("parcel.writeBuffer(_hidl_blob);");
            },
        );
        w.blank();

        w.line("public static final void writeVectorToParcel(");
        w.block(
            format!("        android.os.HwParcel parcel, java.util.ArrayList<{fq}> _hidl_vec) {{"),
            "}",
            |w| {
                w.line(format!(
                    "android.os.HwBlob _hidl_blob = new android.os.HwBlob({descriptor} /* sizeof(hidl_vec<T>) */);"
                ));
                self.write_vector(w, plan.type_id, "_hidl_vec", "_hidl_blob", "0", 0);
                w.blank();
                w.line("parcel.writeBuffer(_hidl_blob);");
            },
        );
        w.blank();

        w.line("public final void writeEmbeddedToBlob(");
        w.block(
            "        android.os.HwBlob _hidl_blob, long _hidl_offset) {",
            "}",
            |w| {
                for slot in &plan.layout.fields {
                    let offset = format!("_hidl_offset + {}", slot.offset);
                    self.write_embedded(w, slot.type_id, &slot.name, "_hidl_blob", &offset, 0);
                }
            },
        );
    }

    /// Fill `target` from the bytes of `blob` at `offset`.
    fn read_embedded(&self, w: &mut SourceWriter, id: TypeId, target: &str, blob: &str, offset: &str, depth: usize) {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) => {
                w.line(format!("{target} = {blob}.get{}({offset});", kind.managed_suffix()));
            }
            TypeKind::Enum { storage, .. } => {
                w.line(format!("{target} = {blob}.get{}({offset});", storage.managed_suffix()));
            }
            TypeKind::String => {
                w.line(format!("{target} = {blob}.getString({offset});"));
                w.line(format!(
                    "parcel.readEmbeddedBuffer(\n        {target}.getBytes().length + 1,\n        {blob}.handle(),\n        {offset} + {BUFFER_POINTER_OFFSET} /* offsetof(hidl_string, mBuffer) */,false /* nullable */);"
                ));
                w.blank();
            }
            TypeKind::Vector(_) => {
                self.read_vector(w, id, target, blob, offset, depth);
            }
            TypeKind::Array { element, len } => {
                let size = self.size_of(*element);
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (int {index} = 0; {index} < {len}; ++{index}) {{"),
                    "}",
                    |w| {
                        let item = format!("{target}[{index}]");
                        let offset = format!("{offset} + {index} * {size}");
                        self.read_embedded(w, *element, &item, blob, &offset, depth + 1);
                    },
                );
            }
            TypeKind::Compound(_) => {
                w.line(format!("{target}.readEmbeddedFromParcel(parcel, {blob}, {offset});"));
            }
            TypeKind::Interface { .. } | TypeKind::Ref(_) => {}
        }
    }

    /// Read the vector descriptor at `offset` in `blob` and its child buffer.
    fn read_vector(&self, w: &mut SourceWriter, id: TypeId, target: &str, blob: &str, offset: &str, depth: usize) {
        let element = match self.arena.get(id) {
            TypeKind::Vector(element) => *element,
            // `readVectorFromParcel` of a compound reads a vector of itself.
            _ => id,
        };
        let size = self.size_of(element);
        let count = format!("_hidl_vec_size_{depth}");
        let child = format!("childBlob_{depth}");
        let index = format!("_hidl_index_{depth}");
        let item = format!("_hidl_vec_element_{depth}");

        w.block("{", "}", |w| {
            w.line(format!(
                "int {count} = {blob}.getInt32({offset} + {BUFFER_SIZE_OFFSET} /* offsetof(hidl_vec<T>, mSize) */);"
            ));
            w.line(format!(
                "android.os.HwBlob {child} = parcel.readEmbeddedBuffer(\n        {count} * {size},{blob}.handle(),\n        {offset} + {BUFFER_POINTER_OFFSET} /* offsetof(hidl_vec<T>, mBuffer) */,true /* nullable */);"
            ));
            w.blank();
            w.line(format!("{target}.clear();"));
            w.block(
                format!("for (int {index} = 0; {index} < {count}; ++{index}) {{"),
                "}",
                |w| {
                    assert!(
                        !contains_interface(self.arena, element),
                        "{} carries interface handles inside a buffer",
                        self.arena.display_name(element)
                    );
                    w.line(format!(
                        "{} {item} = {};",
                        self.type_name(element, false),
                        self.default_value(element)
                    ));
                    let offset = format!("{index} * {size}");
                    self.read_embedded(w, element, &item, &child, &offset, depth + 1);
                    w.line(format!("{target}.add({item});"));
                },
            );
        });
    }

    /// Store `source` into `blob` at `offset`.
    fn write_embedded(&self, w: &mut SourceWriter, id: TypeId, source: &str, blob: &str, offset: &str, depth: usize) {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) => {
                w.line(format!("{blob}.put{}({offset}, {source});", kind.managed_suffix()));
            }
            TypeKind::Enum { storage, .. } => {
                w.line(format!("{blob}.put{}({offset}, {source});", storage.managed_suffix()));
            }
            TypeKind::String => {
                w.line(format!("{blob}.putString({offset}, {source});"));
            }
            TypeKind::Vector(_) => {
                self.write_vector(w, id, source, blob, offset, depth);
            }
            TypeKind::Array { element, len } => {
                let size = self.size_of(*element);
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (int {index} = 0; {index} < {len}; ++{index}) {{"),
                    "}",
                    |w| {
                        let item = format!("{source}[{index}]");
                        let offset = format!("{offset} + {index} * {size}");
                        self.write_embedded(w, *element, &item, blob, &offset, depth + 1);
                    },
                );
            }
            TypeKind::Compound(_) => {
                w.line(format!("{source}.writeEmbeddedToBlob({blob}, {offset});"));
            }
            TypeKind::Interface { .. } | TypeKind::Ref(_) => {}
        }
    }

    fn write_vector(&self, w: &mut SourceWriter, id: TypeId, source: &str, blob: &str, offset: &str, depth: usize) {
        let element = match self.arena.get(id) {
            TypeKind::Vector(element) => *element,
            _ => id,
        };
        let size = self.size_of(element);
        let count = format!("_hidl_vec_size_{depth}");
        let child = format!("childBlob_{depth}");
        let index = format!("_hidl_index_{depth}");

        w.block("{", "}", |w| {
            w.line(format!("int {count} = {source}.size();"));
            w.line(format!(
                "{blob}.putInt32({offset} + {BUFFER_SIZE_OFFSET} /* offsetof(hidl_vec<T>, mSize) */, {count});"
            ));
            w.line(format!(
                "{blob}.putBool({offset} + {BUFFER_OWNER_OFFSET} /* offsetof(hidl_vec<T>, mOwnsBuffer) */, false);"
            ));
            w.line(format!(
                "android.os.HwBlob {child} = new android.os.HwBlob((int)({count} * {size}));"
            ));
            w.block(
                format!("for (int {index} = 0; {index} < {count}; ++{index}) {{"),
                "}",
                |w| {
                    assert!(
                        !contains_interface(self.arena, element),
                        "{} carries interface handles inside a buffer",
                        self.arena.display_name(element)
                    );
                    let item = format!("{source}.get({index})");
                    let offset = format!("{index} * {size}");
                    self.write_embedded(w, element, &item, &child, &offset, depth + 1);
                },
            );
            w.line(format!(
                "{blob}.putBlob({offset} + {BUFFER_POINTER_OFFSET} /* offsetof(hidl_vec<T>, mBuffer) */, {child});"
            ));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NamedReference, ScalarKind, SourceLocation, Style};

    fn field(name: &str, type_id: TypeId) -> NamedReference {
        NamedReference::new(name, type_id, SourceLocation::builtin())
    }

    fn define(arena: &mut TypeArena, name: &str, style: Style, fields: Vec<NamedReference>) -> TypeId {
        let id = arena
            .declare_compound(name, style, SourceLocation::builtin())
            .expect("declare");
        arena.define_fields(id, fields);
        id
    }

    fn class(arena: &TypeArena, id: TypeId, scope: ClassScope) -> Result<String, EmitError> {
        let plan = MarshalPlan::build(arena, id);
        let mut w = SourceWriter::new();
        ManagedEmitter::new(arena).emit_class(&mut w, &plan, scope)?;
        Ok(w.finish())
    }

    #[test]
    fn flat_class_copies_fields_through_blob() {
        let mut arena = TypeArena::new();
        let i32_id = arena.add_scalar(ScalarKind::Int32);
        let u8_id = arena.add_scalar(ScalarKind::Uint8);
        let bytes = arena.add_vector(u8_id);
        let id = define(
            &mut arena,
            "pkg::Packet",
            Style::Struct,
            vec![field("x", i32_id), field("y", bytes), field("z", u8_id)],
        );

        let out = class(&arena, id, ClassScope::Nested).expect("java class");
        assert!(out.starts_with("public final static class Packet {\n"));
        assert!(out.contains("    public int x = 0;\n"));
        assert!(out.contains("    public java.util.ArrayList<Byte> y = new java.util.ArrayList<Byte>();\n"));
        assert!(out.contains("android.os.HwBlob blob = parcel.readBuffer(32 /* size */);"));
        assert!(out.contains("x = _hidl_blob.getInt32(_hidl_offset + 0);"));
        assert!(out.contains("int _hidl_vec_size_0 = _hidl_blob.getInt32(_hidl_offset + 8 + 8 /* offsetof(hidl_vec<T>, mSize) */);"));
        assert!(out.contains("_hidl_blob.putInt8(_hidl_offset + 24, z);"));
        assert!(out.contains("childBlob_0.putInt8(_hidl_index_0 * 1, y.get(_hidl_index_0));"));
        assert!(out.contains("public static final java.util.ArrayList<pkg.Packet> readVectorFromParcel("));
        assert!(out.contains("_hidl_vec_element_0.readEmbeddedFromParcel(parcel, childBlob_0, _hidl_index_0 * 32);"));
        assert!(out.contains("android.os.HidlSupport.deepEquals(this.y, other.y)"));
        assert!(out.trim_end().ends_with("};"));
    }

    #[test]
    fn top_level_scope_drops_static() {
        let mut arena = TypeArena::new();
        let id = define(&mut arena, "pkg::Empty", Style::Struct, Vec::new());
        let out = class(&arena, id, ClassScope::TopLevel).expect("java class");
        assert!(out.starts_with("public final class Empty {\n"));
        assert!(out.contains("        return 0;\n"));
    }

    #[test]
    fn live_class_uses_parcel_calls() {
        let mut arena = TypeArena::new();
        let cb = arena.add_interface("pkg::ICallback").expect("interface");
        let string = arena.add_string();
        let id = define(
            &mut arena,
            "pkg::Session",
            Style::Struct,
            vec![field("name", string), field("cb", cb)],
        );

        let out = class(&arena, id, ClassScope::Nested).expect("java class");
        assert!(out.contains("name = parcel.readString();"));
        assert!(out.contains("cb = pkg.ICallback.asInterface(parcel.readStrongBinder());"));
        assert!(out.contains("parcel.writeStrongBinder(cb == null ? null : cb.asBinder());"));
        assert!(!out.contains("readEmbeddedFromParcel"));
    }

    #[test]
    fn live_interface_grid_indexes_each_dimension() {
        let mut arena = TypeArena::new();
        let cb = arena.add_interface("pkg::ICallback").expect("interface");
        let row = arena.add_array(cb, 3);
        let grid = arena.add_array(row, 2);
        let id = define(&mut arena, "pkg::Fanout", Style::Struct, vec![field("cbs", grid)]);

        let out = class(&arena, id, ClassScope::Nested).expect("java class");
        assert!(out.contains("for (int _hidl_index_0 = 0; _hidl_index_0 < 2; ++_hidl_index_0) {"));
        assert!(out.contains("for (int _hidl_index_1 = 0; _hidl_index_1 < 3; ++_hidl_index_1) {"));
        assert!(out.contains(
            "cbs[_hidl_index_0][_hidl_index_1] = pkg.ICallback.asInterface(parcel.readStrongBinder());"
        ));
        assert_eq!(out.matches("int _hidl_index_0 = 0").count(), 2);
        assert!(!out.contains("int _hidl_index_2"));
    }

    #[test]
    #[should_panic(expected = "carries interface handles inside a buffer")]
    fn vector_of_interface_holders_is_refused() {
        let mut arena = TypeArena::new();
        let cb = arena.add_interface("pkg::ICallback").expect("interface");
        let holder = define(&mut arena, "pkg::Holder", Style::Struct, vec![field("cb", cb)]);
        let holders = arena.add_vector(holder);
        let id = define(&mut arena, "pkg::Outer", Style::Struct, vec![field("holders", holders)]);

        let _ = class(&arena, id, ClassScope::Nested);
    }

    #[test]
    fn object_arrays_are_filled() {
        let mut arena = TypeArena::new();
        let string = arena.add_string();
        let row = arena.add_array(string, 3);
        let grid = arena.add_array(row, 2);
        let id = define(&mut arena, "pkg::Grid", Style::Struct, vec![field("cells", grid)]);

        let out = class(&arena, id, ClassScope::Nested).expect("java class");
        assert!(out.contains("public final String[][] cells = new String[2][3];"));
        assert!(out.contains("this.cells[_hidl_index_0][_hidl_index_1] = new String();"));
        assert!(out.contains("java.util.Arrays.deepToString(this.cells)"));
    }

    #[test]
    fn union_and_refs_are_rejected() {
        let mut arena = TypeArena::new();
        let i32_id = arena.add_scalar(ScalarKind::Int32);
        let ptr = arena.add_ref(i32_id);
        let union = define(&mut arena, "pkg::U", Style::Union, vec![field("a", i32_id)]);
        let with_ref = define(&mut arena, "pkg::P", Style::Struct, vec![field("p", ptr)]);

        for id in [union, with_ref] {
            assert!(matches!(
                class(&arena, id, ClassScope::Nested),
                Err(EmitError::NotJavaCompatible { .. })
            ));
        }
    }
}
