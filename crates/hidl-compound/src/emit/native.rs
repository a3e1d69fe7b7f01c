// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! C++ backend: value-type declarations plus parcel marshalling.
//!
//! A flat compound travels as one buffer. Its variable-length contents are
//! written by `writeEmbeddedToParcel` relative to that buffer's
//! `(parentHandle, parentOffset)`, and out-of-line pointers are patched by
//! `writeEmbeddedReferenceToParcel` against the very same pair. Both passes
//! take their per-field offset from [`NativeEmitter::field_offset`].

use super::{sanitize, ErrorMode, SourceWriter};
use crate::marshal::{MarshalPlan, Strategy};
use crate::properties::{contains_interface, needs_embedded_read_write, needs_resolve_references};
use crate::types::{ScalarKind, Style, TypeArena, TypeId, TypeKind};

const HIDL_STRING: &str = "::android::hardware::hidl_string";
const PARCEL: &str = "::android::hardware::Parcel";
const PARENT_OFFSET_ZERO: &str = "0 /* parentOffset */";

/// `pkg::Foo` -> `::pkg::Foo`.
pub fn qualified(name: &str) -> String {
    format!("::{name}")
}

pub struct NativeEmitter<'a> {
    arena: &'a TypeArena,
    mode: ErrorMode,
}

impl<'a> NativeEmitter<'a> {
    pub fn new(arena: &'a TypeArena, mode: ErrorMode) -> Self {
        Self { arena, mode }
    }

    /// C++ spelling of a field type.
    pub fn type_name(&self, id: TypeId) -> String {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) => kind.native_name().to_string(),
            TypeKind::Enum { name, .. } => qualified(name),
            TypeKind::String => HIDL_STRING.to_string(),
            TypeKind::Vector(element) => {
                format!("::android::hardware::hidl_vec<{}>", self.type_name(*element))
            }
            TypeKind::Array { element, len } => {
                format!("::android::hardware::hidl_array<{}, {len}>", self.type_name(*element))
            }
            TypeKind::Ref(target) => format!("{} const*", self.type_name(*target)),
            TypeKind::Interface { name } => format!("::android::sp<{}>", qualified(name)),
            TypeKind::Compound(compound) => qualified(compound.name()),
        }
    }

    /// Whether a reader of this compound receives a pointer into the parcel
    /// (flat path) rather than filling a caller-owned value (live path).
    pub fn result_needs_deref(plan: &MarshalPlan) -> bool {
        plan.is_flat()
    }

    /// Offset expression of `field` relative to the enclosing buffer, shared
    /// by the embedded and the reference pass.
    pub fn field_offset(plan: &MarshalPlan, field: &str) -> String {
        format!("parentOffset + offsetof({}, {field})", qualified(&plan.name))
    }

    // ----------------------------------------------------------------------
    // Declarations
    // ----------------------------------------------------------------------

    /// The value type followed by its layout assertions.
    ///
    /// Pointer-bearing types keep natural member alignment and get no
    /// assertions, since they are never copied as raw memory.
    pub fn emit_declaration(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        let local = plan.name.rsplit("::").next().unwrap_or(&plan.name);
        let keyword = match plan.layout.style {
            Style::Struct => "struct",
            Style::Union => "union",
        };
        let pinned = !plan.facts.contains_pointer;

        w.block(format!("{keyword} {local} final {{"), "};", |w| {
            for slot in &plan.layout.fields {
                let ty = self.type_name(slot.type_id);
                if pinned {
                    w.line(format!(
                        "{ty} {} __attribute__ ((aligned({})));",
                        slot.name, slot.layout.align
                    ));
                } else {
                    w.line(format!("{ty} {};", slot.name));
                }
            }
        });

        if pinned {
            let fq = qualified(&plan.name);
            w.blank();
            for slot in &plan.layout.fields {
                w.line(format!(
                    "static_assert(offsetof({fq}, {}) == {}, \"wrong offset\");",
                    slot.name, slot.offset
                ));
            }
            w.line(format!(
                "static_assert(sizeof({fq}) == {}, \"wrong size\");",
                plan.layout.layout.size
            ));
            w.line(format!(
                "static_assert(__alignof({fq}) == {}, \"wrong alignment\");",
                plan.layout.layout.align
            ));
        }
    }

    /// `operator==`/`operator!=`/`hash` prototypes, or a comment saying they
    /// do not exist so comparisons fail to compile.
    pub fn emit_equality_declarations(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        let fq = qualified(&plan.name);
        if !plan.facts.can_check_equality {
            w.line(format!("// operator==, operator!= and hash are not generated for {fq}"));
            return;
        }
        w.line(format!("static inline bool operator==(const {fq}& lhs, const {fq}& rhs);"));
        w.line(format!("static inline bool operator!=(const {fq}& lhs, const {fq}& rhs);"));
        w.line(format!("static inline size_t hash(const {fq}& o);"));
    }

    pub fn emit_equality_definitions(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        if !plan.facts.can_check_equality {
            return;
        }
        let fq = qualified(&plan.name);
        w.block(
            format!("static inline bool operator==(const {fq}& lhs, const {fq}& rhs) {{"),
            "}",
            |w| {
                for slot in &plan.layout.fields {
                    w.block(format!("if (lhs.{0} != rhs.{0}) {{", slot.name), "}", |w| {
                        w.line("return false;");
                    });
                }
                w.line("return true;");
            },
        );
        w.blank();
        w.block(
            format!("static inline bool operator!=(const {fq}& lhs, const {fq}& rhs) {{"),
            "}",
            |w| {
                w.line("return !(lhs == rhs);");
            },
        );
        w.blank();
        w.block(format!("static inline size_t hash(const {fq}& o) {{"), "}", |w| {
            w.line("size_t _hidl_hash = 0;");
            for slot in &plan.layout.fields {
                self.hash_field(w, slot.type_id, &format!("o.{}", slot.name), 0);
            }
            w.line("return _hidl_hash;");
        });
    }

    /// Fold one value into `_hidl_hash`, element by element for containers.
    fn hash_field(&self, w: &mut SourceWriter, id: TypeId, expr: &str, depth: usize) {
        let value = match self.arena.get(id) {
            TypeKind::Scalar(kind) => format!("std::hash<{}>{{}}({expr})", kind.native_name()),
            TypeKind::Enum { storage, .. } => {
                let raw = storage.native_name();
                format!("std::hash<{raw}>{{}}(static_cast<{raw}>({expr}))")
            }
            TypeKind::String => format!("std::hash<std::string>{{}}(std::string({expr}))"),
            TypeKind::Interface { .. } => format!("std::hash<const void*>{{}}({expr}.get())"),
            TypeKind::Ref(_) => format!("std::hash<const void*>{{}}({expr})"),
            TypeKind::Compound(_) => format!("hash({expr})"),
            TypeKind::Vector(element) => {
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (size_t {index} = 0; {index} < {expr}.size(); ++{index}) {{"),
                    "}",
                    |w| self.hash_field(w, *element, &format!("{expr}[{index}]"), depth + 1),
                );
                return;
            }
            TypeKind::Array { element, len } => {
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (size_t {index} = 0; {index} < {len}; ++{index}) {{"),
                    "}",
                    |w| self.hash_field(w, *element, &format!("{expr}[{index}]"), depth + 1),
                );
                return;
            }
        };
        w.line(format!(
            "_hidl_hash ^= {value} + 0x9e3779b9 + (_hidl_hash << 6) + (_hidl_hash >> 2);"
        ));
    }

    pub fn emit_to_string_declaration(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        w.line(format!(
            "static inline std::string toString(const {}& o);",
            qualified(&plan.name)
        ));
    }

    /// Field-by-field dump in `{.a = 1, .b = "x"}` form.
    pub fn emit_to_string(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        w.block(
            format!("static inline std::string toString(const {}& o) {{", qualified(&plan.name)),
            "}",
            |w| {
                w.line("using ::android::hardware::toString;");
                w.line("std::string os;");
                w.line("os += \"{\";");
                for (index, slot) in plan.layout.fields.iter().enumerate() {
                    let sep = if index == 0 { "" } else { ", " };
                    w.line(format!("os += \"{sep}.{} = \";", slot.name));
                    w.line(format!("os += toString(o.{});", slot.name));
                }
                w.line("os += \"}\";");
                w.line("return os;");
            },
        );
    }

    /// Prototypes for the embedded pass, when the compound has one.
    pub fn emit_embedded_declarations(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        if !plan.needs_embedded() {
            return;
        }
        let fq = qualified(&plan.name);
        w.line(format!(
            "::android::status_t readEmbeddedFromParcel(\n        const {fq} &obj,\n        const {PARCEL} &parcel,\n        size_t parentHandle,\n        size_t parentOffset);"
        ));
        w.blank();
        w.line(format!(
            "::android::status_t writeEmbeddedToParcel(\n        const {fq} &obj,\n        {PARCEL} &parcel,\n        size_t parentHandle,\n        size_t parentOffset);"
        ));
    }

    /// Prototypes for the reference pass, when the compound has one.
    pub fn emit_reference_declarations(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        if !plan.needs_references() {
            return;
        }
        let fq = qualified(&plan.name);
        w.line(format!(
            "::android::status_t readEmbeddedReferenceFromParcel(\n        const {fq} &obj,\n        const {PARCEL} &parcel,\n        size_t parentHandle,\n        size_t parentOffset);"
        ));
        w.blank();
        w.line(format!(
            "::android::status_t writeEmbeddedReferenceToParcel(\n        const {fq} &obj,\n        {PARCEL} &parcel,\n        size_t parentHandle,\n        size_t parentOffset);"
        ));
    }

    // ----------------------------------------------------------------------
    // Definitions
    // ----------------------------------------------------------------------

    /// `readEmbeddedFromParcel` and `writeEmbeddedToParcel` bodies.
    ///
    /// # Panics
    ///
    /// Panics if the plan has no embedded pass.
    pub fn emit_embedded_definitions(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        assert!(
            plan.needs_embedded(),
            "`{}` has no embedded pass to emit",
            plan.name
        );
        for is_reader in [true, false] {
            let function = if is_reader {
                "readEmbeddedFromParcel"
            } else {
                "writeEmbeddedToParcel"
            };
            self.emit_pass_function(w, plan, function, is_reader, |this, w| {
                for field in plan.embedded() {
                    let value = format!("obj.{}", field.name);
                    let offset = Self::field_offset(plan, &field.name);
                    this.embedded(w, field.type_id, &value, "parcel", is_reader, "parentHandle", &offset, 0);
                }
            });
            if is_reader {
                w.blank();
            }
        }
    }

    /// `readEmbeddedReferenceFromParcel` and `writeEmbeddedReferenceToParcel`
    /// bodies.
    ///
    /// # Panics
    ///
    /// Panics if the plan has no reference pass; asking for one means the
    /// compound was never validated or planned.
    pub fn emit_reference_definitions(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        assert!(
            plan.needs_references(),
            "`{}` does not need reference resolution",
            plan.name
        );
        for is_reader in [true, false] {
            let function = if is_reader {
                "readEmbeddedReferenceFromParcel"
            } else {
                "writeEmbeddedReferenceToParcel"
            };
            self.emit_pass_function(w, plan, function, is_reader, |this, w| {
                for field in plan.references() {
                    let value = format!("obj.{}", field.name);
                    let offset = Self::field_offset(plan, &field.name);
                    this.references(w, field.type_id, &value, "parcel", is_reader, "parentHandle", &offset, 0);
                }
            });
            if is_reader {
                w.blank();
            }
        }
    }

    fn emit_pass_function(
        &self,
        w: &mut SourceWriter,
        plan: &MarshalPlan,
        function: &str,
        is_reader: bool,
        body: impl FnOnce(&Self, &mut SourceWriter),
    ) {
        let fq = qualified(&plan.name);
        let parcel = if is_reader {
            format!("const {PARCEL} &parcel")
        } else {
            format!("{PARCEL} &parcel")
        };
        w.line(format!(
            "::android::status_t {function}(\n        const {fq} &obj,\n        {parcel},\n        size_t parentHandle,\n        size_t parentOffset) {{"
        ));
        w.indent();
        w.line("::android::status_t _hidl_err = ::android::OK;");
        w.blank();
        body(self, w);
        w.unindent();
        if self.mode == ErrorMode::Goto {
            w.line("_hidl_error:");
        }
        w.indent();
        w.line("return _hidl_err;");
        w.unindent();
        w.line("}");
    }

    // ----------------------------------------------------------------------
    // Top-level reader/writer
    // ----------------------------------------------------------------------

    /// Read or write the variable `name` of the planned compound through
    /// `parcel`, inside a function that declares `_hidl_err`.
    ///
    /// On the flat path a reader's `name` is a `const T*` pointed into the
    /// parcel (see [`Self::result_needs_deref`]); on the live path it is a
    /// value filled field by field.
    ///
    /// # Panics
    ///
    /// Panics if a field is a vector or ref holding interface handles
    /// (see [`crate::properties::buffers_interface`]).
    pub fn emit_reader_writer(
        &self,
        w: &mut SourceWriter,
        plan: &MarshalPlan,
        name: &str,
        parcel: &str,
        is_reader: bool,
    ) {
        match &plan.strategy {
            Strategy::Live { fields } => {
                for field in fields {
                    let expr = format!("{name}.{}", field.name);
                    self.field_reader_writer(w, field.type_id, &expr, parcel, is_reader, 0);
                }
            }
            Strategy::Flat { .. } => {
                let parent = format!("_hidl_{}_parent", sanitize(name));
                self.flat_reader_writer(w, plan.type_id, name, &parent, parcel, is_reader);
            }
        }
    }

    /// One buffer for the value, then its embedded and reference passes
    /// against the buffer's handle. A reader's `name` is a pointer.
    fn flat_reader_writer(
        &self,
        w: &mut SourceWriter,
        id: TypeId,
        name: &str,
        parent: &str,
        parcel: &str,
        is_reader: bool,
    ) {
        w.line(format!("size_t {parent};"));
        w.blank();
        if is_reader {
            w.line(format!(
                "_hidl_err = {parcel}.readBuffer(sizeof(*{name}), &{parent},  reinterpret_cast<const void **>(&{name}));"
            ));
        } else {
            w.line(format!(
                "_hidl_err = {parcel}.writeBuffer(&{name}, sizeof({name}), &{parent});"
            ));
        }
        self.mode.check(w);

        let value = if is_reader {
            format!("(*{name})")
        } else {
            name.to_string()
        };
        if needs_embedded_read_write(self.arena, id) {
            w.blank();
            self.embedded(w, id, &value, parcel, is_reader, parent, PARENT_OFFSET_ZERO, 0);
        }
        if needs_resolve_references(self.arena, id) {
            w.blank();
            self.references(w, id, &value, parcel, is_reader, parent, PARENT_OFFSET_ZERO, 0);
        }
    }

    /// Standalone read/write of one field value on the live path.
    fn field_reader_writer(
        &self,
        w: &mut SourceWriter,
        id: TypeId,
        expr: &str,
        parcel: &str,
        is_reader: bool,
        depth: usize,
    ) {
        match self.arena.get(id) {
            TypeKind::Scalar(kind) => {
                let suffix = kind.parcel_suffix();
                if is_reader {
                    w.line(format!("_hidl_err = {parcel}.read{suffix}(&{expr});"));
                } else {
                    w.line(format!("_hidl_err = {parcel}.write{suffix}({expr});"));
                }
                self.mode.check(w);
                w.blank();
            }
            TypeKind::Enum { storage, .. } => {
                self.enum_reader_writer(w, *storage, expr, parcel, is_reader);
            }
            TypeKind::Interface { name } => {
                self.interface_reader_writer(w, name, expr, parcel, is_reader);
            }
            TypeKind::Compound(compound) if contains_interface(self.arena, id) => {
                for field in compound.fields() {
                    let member = format!("{expr}.{}", field.name());
                    self.field_reader_writer(w, field.type_id(), &member, parcel, is_reader, depth);
                }
            }
            TypeKind::Array { element, len } if contains_interface(self.arena, *element) => {
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (size_t {index} = 0; {index} < {len}; ++{index}) {{"),
                    "}",
                    |w| {
                        let item = format!("{expr}[{index}]");
                        self.field_reader_writer(w, *element, &item, parcel, is_reader, depth + 1);
                    },
                );
                w.blank();
            }
            _ if contains_interface(self.arena, id) => {
                panic!("{} carries interface handles inside a buffer", self.arena.display_name(id));
            }
            _ => {
                let s = sanitize(expr);
                let parent = format!("_hidl_{s}_parent");
                if is_reader {
                    let ptr = format!("_hidl_{s}_ptr");
                    w.line(format!("{} const *{ptr};", self.type_name(id)));
                    self.flat_reader_writer(w, id, &ptr, &parent, parcel, true);
                    w.line(format!("{expr} = *{ptr};"));
                    w.blank();
                } else {
                    self.flat_reader_writer(w, id, expr, &parent, parcel, false);
                }
            }
        }
    }

    fn enum_reader_writer(
        &self,
        w: &mut SourceWriter,
        storage: ScalarKind,
        expr: &str,
        parcel: &str,
        is_reader: bool,
    ) {
        let suffix = storage.parcel_suffix();
        let raw = storage.native_name();
        if is_reader {
            w.line(format!(
                "_hidl_err = {parcel}.read{suffix}(reinterpret_cast<{raw} *>(&{expr}));"
            ));
        } else {
            w.line(format!(
                "_hidl_err = {parcel}.write{suffix}(static_cast<{raw}>({expr}));"
            ));
        }
        self.mode.check(w);
        w.blank();
    }

    fn interface_reader_writer(
        &self,
        w: &mut SourceWriter,
        name: &str,
        expr: &str,
        parcel: &str,
        is_reader: bool,
    ) {
        let fq = qualified(name);
        if is_reader {
            w.block("{", "}", |w| {
                w.line("::android::sp<::android::hardware::IBinder> _hidl_binder;");
                w.line(format!("_hidl_err = {parcel}.readNullableStrongBinder(&_hidl_binder);"));
                self.mode.check(w);
                w.blank();
                w.line(format!(
                    "{expr} = ::android::hardware::fromBinder<{fq}>(_hidl_binder);"
                ));
            });
        } else {
            w.block(format!("if ({expr} == nullptr) {{"), "} else {", |w| {
                w.line(format!("_hidl_err = {parcel}.writeStrongBinder(nullptr);"));
            });
            w.indent();
            w.line(format!(
                "::android::sp<::android::hardware::IBinder> _hidl_binder = ::android::hardware::getOrCreateCachedBinder({expr}.get());"
            ));
            w.block("if (_hidl_binder.get() != nullptr) {", "} else {", |w| {
                w.line(format!("_hidl_err = {parcel}.writeStrongBinder(_hidl_binder);"));
            });
            w.indent();
            w.line("_hidl_err = ::android::UNKNOWN_ERROR;");
            w.unindent();
            w.line("}");
            w.unindent();
            w.line("}");
            self.mode.check(w);
        }
        w.blank();
    }

    // ----------------------------------------------------------------------
    // Pass hooks
    // ----------------------------------------------------------------------

    /// `_hidl_err = function(args...);` followed by the status check.
    fn call(&self, w: &mut SourceWriter, function: &str, args: &[String]) {
        let args = args.join(",\n        ");
        w.line(format!("_hidl_err = {function}(\n        {args});"));
        self.mode.check(w);
    }

    /// Second pass for the value `value` placed at `offset` inside `parent`.
    #[allow(clippy::too_many_arguments)]
    fn embedded(
        &self,
        w: &mut SourceWriter,
        id: TypeId,
        value: &str,
        parcel: &str,
        is_reader: bool,
        parent: &str,
        offset: &str,
        depth: usize,
    ) {
        match self.arena.get(id) {
            TypeKind::String => {
                let target = if is_reader {
                    format!("const_cast<{HIDL_STRING} &>({value})")
                } else {
                    value.to_string()
                };
                let function = if is_reader {
                    "::android::hardware::readEmbeddedFromParcel"
                } else {
                    "::android::hardware::writeEmbeddedToParcel"
                };
                self.call(w, function, &[target, parcel.to_string(), parent.to_string(), offset.to_string()]);
                w.blank();
            }
            TypeKind::Vector(element) => {
                let child = format!("_hidl_{}_child", sanitize(value));
                let target = if is_reader {
                    format!("const_cast<{} &>({value})", self.type_name(id))
                } else {
                    value.to_string()
                };
                let function = if is_reader {
                    "::android::hardware::readEmbeddedFromParcel"
                } else {
                    "::android::hardware::writeEmbeddedToParcel"
                };
                w.line(format!("size_t {child};"));
                w.blank();
                self.call(
                    w,
                    function,
                    &[target, parcel.to_string(), parent.to_string(), offset.to_string(), format!("&{child}")],
                );
                w.blank();

                assert!(
                    !contains_interface(self.arena, *element),
                    "{} carries interface handles inside a buffer",
                    self.arena.display_name(id)
                );
                if needs_embedded_read_write(self.arena, *element) {
                    let element_type = self.type_name(*element);
                    let index = format!("_hidl_index_{depth}");
                    w.block(
                        format!("for (size_t {index} = 0; {index} < {value}.size(); ++{index}) {{"),
                        "}",
                        |w| {
                            let item = format!("{value}[{index}]");
                            let offset = format!("{index} * sizeof({element_type})");
                            self.embedded(w, *element, &item, parcel, is_reader, &child, &offset, depth + 1);
                        },
                    );
                    w.blank();
                }
            }
            TypeKind::Array { element, len } => {
                if !needs_embedded_read_write(self.arena, *element) {
                    return;
                }
                let element_type = self.type_name(*element);
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (size_t {index} = 0; {index} < {len}; ++{index}) {{"),
                    "}",
                    |w| {
                        let item = format!("{value}[{index}]");
                        let offset = format!("{offset} + {index} * sizeof({element_type})");
                        self.embedded(w, *element, &item, parcel, is_reader, parent, &offset, depth + 1);
                    },
                );
                w.blank();
            }
            TypeKind::Compound(_) => {
                let (function, target) = if is_reader {
                    ("readEmbeddedFromParcel", format!("const_cast<{} &>({value})", self.type_name(id)))
                } else {
                    ("writeEmbeddedToParcel", value.to_string())
                };
                self.call(w, function, &[target, parcel.to_string(), parent.to_string(), offset.to_string()]);
                w.blank();
            }
            TypeKind::Scalar(_) | TypeKind::Enum { .. } | TypeKind::Ref(_) | TypeKind::Interface { .. } => {}
        }
    }

    /// Third pass: patch out-of-line pointers of `value` at `offset` inside
    /// `parent`.
    #[allow(clippy::too_many_arguments)]
    fn references(
        &self,
        w: &mut SourceWriter,
        id: TypeId,
        value: &str,
        parcel: &str,
        is_reader: bool,
        parent: &str,
        offset: &str,
        depth: usize,
    ) {
        match self.arena.get(id) {
            TypeKind::Ref(target) => {
                let child = format!("_hidl_{}_child", sanitize(value));
                let (function, pointer) = if is_reader {
                    (
                        "::android::hardware::readEmbeddedReferenceFromParcel",
                        format!("const_cast<{} const **>(&{value})", self.type_name(*target)),
                    )
                } else {
                    ("::android::hardware::writeEmbeddedReferenceToParcel", value.to_string())
                };
                w.line(format!("size_t {child};"));
                w.blank();
                self.call(
                    w,
                    function,
                    &[pointer, parcel.to_string(), parent.to_string(), offset.to_string(), format!("&{child}")],
                );
                w.blank();

                let embedded = needs_embedded_read_write(self.arena, *target);
                let nested = needs_resolve_references(self.arena, *target);
                if embedded || nested {
                    w.block(format!("if ({value} != nullptr) {{"), "}", |w| {
                        let pointee = format!("(*{value})");
                        if embedded {
                            self.embedded(w, *target, &pointee, parcel, is_reader, &child, PARENT_OFFSET_ZERO, depth);
                        }
                        if nested {
                            self.references(w, *target, &pointee, parcel, is_reader, &child, PARENT_OFFSET_ZERO, depth);
                        }
                    });
                    w.blank();
                }
            }
            TypeKind::Vector(element) => {
                if !needs_resolve_references(self.arena, *element) {
                    return;
                }
                let child = format!("_hidl_{}_child", sanitize(value));
                w.line(format!("size_t {child};"));
                w.blank();
                self.call(
                    w,
                    "::android::hardware::findInParcel",
                    &[value.to_string(), parcel.to_string(), format!("&{child}")],
                );
                w.blank();

                let element_type = self.type_name(*element);
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (size_t {index} = 0; {index} < {value}.size(); ++{index}) {{"),
                    "}",
                    |w| {
                        let item = format!("{value}[{index}]");
                        let offset = format!("{index} * sizeof({element_type})");
                        self.references(w, *element, &item, parcel, is_reader, &child, &offset, depth + 1);
                    },
                );
                w.blank();
            }
            TypeKind::Array { element, len } => {
                if !needs_resolve_references(self.arena, *element) {
                    return;
                }
                let element_type = self.type_name(*element);
                let index = format!("_hidl_index_{depth}");
                w.block(
                    format!("for (size_t {index} = 0; {index} < {len}; ++{index}) {{"),
                    "}",
                    |w| {
                        let item = format!("{value}[{index}]");
                        let offset = format!("{offset} + {index} * sizeof({element_type})");
                        self.references(w, *element, &item, parcel, is_reader, parent, &offset, depth + 1);
                    },
                );
                w.blank();
            }
            TypeKind::Compound(_) => {
                let (function, target) = if is_reader {
                    (
                        "readEmbeddedReferenceFromParcel",
                        format!("const_cast<{} &>({value})", self.type_name(id)),
                    )
                } else {
                    ("writeEmbeddedReferenceToParcel", value.to_string())
                };
                self.call(w, function, &[target, parcel.to_string(), parent.to_string(), offset.to_string()]);
                w.blank();
            }
            TypeKind::Scalar(_) | TypeKind::Enum { .. } | TypeKind::String | TypeKind::Interface { .. } => {}
        }
    }

    // ----------------------------------------------------------------------
    // Bundles
    // ----------------------------------------------------------------------

    /// Everything the header needs for one compound, in dependency order.
    pub fn emit_header(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        self.emit_declaration(w, plan);
        w.blank();
        self.emit_to_string_declaration(w, plan);
        self.emit_equality_declarations(w, plan);
        w.blank();
        if plan.needs_embedded() {
            self.emit_embedded_declarations(w, plan);
            w.blank();
        }
        if plan.needs_references() {
            self.emit_reference_declarations(w, plan);
            w.blank();
        }
    }

    /// Inline helpers that must follow every declaration of the header.
    pub fn emit_inline_definitions(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        self.emit_to_string(w, plan);
        w.blank();
        if plan.facts.can_check_equality {
            self.emit_equality_definitions(w, plan);
            w.blank();
        }
    }

    /// Out-of-line marshalling functions for the source file.
    pub fn emit_source(&self, w: &mut SourceWriter, plan: &MarshalPlan) {
        if plan.needs_embedded() {
            self.emit_embedded_definitions(w, plan);
            w.blank();
        }
        if plan.needs_references() {
            self.emit_reference_definitions(w, plan);
            w.blank();
        }
    }
}

#[cfg(test)]
mod tests;
