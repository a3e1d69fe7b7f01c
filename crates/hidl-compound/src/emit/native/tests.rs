// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

use super::*;
use crate::types::{NamedReference, SourceLocation};

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

fn render(f: impl FnOnce(&mut SourceWriter)) -> String {
    let mut w = SourceWriter::new();
    f(&mut w);
    w.finish()
}

/// `{ x: int32, y: vec<uint8>, z: uint8 }`
fn packet(arena: &mut TypeArena) -> TypeId {
    let i32_id = arena.add_scalar(ScalarKind::Int32);
    let u8_id = arena.add_scalar(ScalarKind::Uint8);
    let bytes = arena.add_vector(u8_id);
    define(
        arena,
        "pkg::Packet",
        Style::Struct,
        vec![field("x", i32_id), field("y", bytes), field("z", u8_id)],
    )
}

/// `{ kind: uint8, payload: vec<uint8>, ptr: ref<uint8> }`
fn blob(arena: &mut TypeArena) -> TypeId {
    let u8_id = arena.add_scalar(ScalarKind::Uint8);
    let payload = arena.add_vector(u8_id);
    let ptr = arena.add_ref(u8_id);
    define(
        arena,
        "pkg::Blob",
        Style::Struct,
        vec![field("kind", u8_id), field("payload", payload), field("ptr", ptr)],
    )
}

#[test]
fn declaration_pins_layout_with_asserts() {
    let mut arena = TypeArena::new();
    let id = packet(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let out = render(|w| NativeEmitter::new(&arena, ErrorMode::Goto).emit_declaration(w, &plan));

    assert!(out.starts_with("struct Packet final {\n"));
    assert!(out.contains("    int32_t x __attribute__ ((aligned(4)));\n"));
    assert!(out.contains("    ::android::hardware::hidl_vec<uint8_t> y __attribute__ ((aligned(8)));\n"));
    assert!(out.contains("static_assert(offsetof(::pkg::Packet, x) == 0, \"wrong offset\");"));
    assert!(out.contains("static_assert(offsetof(::pkg::Packet, y) == 8, \"wrong offset\");"));
    assert!(out.contains("static_assert(offsetof(::pkg::Packet, z) == 24, \"wrong offset\");"));
    assert!(out.contains("static_assert(sizeof(::pkg::Packet) == 32, \"wrong size\");"));
    assert!(out.contains("static_assert(__alignof(::pkg::Packet) == 8, \"wrong alignment\");"));
}

#[test]
fn pointer_bearing_declaration_has_no_asserts() {
    let mut arena = TypeArena::new();
    let id = blob(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let out = render(|w| NativeEmitter::new(&arena, ErrorMode::Goto).emit_declaration(w, &plan));

    assert!(out.contains("    uint8_t const* ptr;\n"));
    assert!(!out.contains("static_assert"));
    assert!(!out.contains("__attribute__"));
}

#[test]
fn union_gets_placeholder_instead_of_equality() {
    let mut arena = TypeArena::new();
    let i32_id = arena.add_scalar(ScalarKind::Int32);
    let f32_id = arena.add_scalar(ScalarKind::Float);
    let id = define(
        &mut arena,
        "pkg::Choice",
        Style::Union,
        vec![field("i", i32_id), field("f", f32_id)],
    );
    let plan = MarshalPlan::build(&arena, id);
    let emitter = NativeEmitter::new(&arena, ErrorMode::Goto);

    let decl = render(|w| emitter.emit_declaration(w, &plan));
    assert!(decl.starts_with("union Choice final {\n"));
    assert!(decl.contains("static_assert(offsetof(::pkg::Choice, f) == 0, \"wrong offset\");"));

    let eq = render(|w| emitter.emit_equality_declarations(w, &plan));
    assert_eq!(eq, "// operator==, operator!= and hash are not generated for ::pkg::Choice\n");
    assert_eq!(render(|w| emitter.emit_equality_definitions(w, &plan)), "");
}

#[test]
fn struct_equality_compares_every_field() {
    let mut arena = TypeArena::new();
    let id = packet(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let out = render(|w| NativeEmitter::new(&arena, ErrorMode::Goto).emit_equality_definitions(w, &plan));

    for name in ["x", "y", "z"] {
        assert!(out.contains(&format!("    if (lhs.{name} != rhs.{name}) {{\n        return false;\n    }}\n")));
    }
    assert!(out.contains("    return !(lhs == rhs);\n"));
}

#[test]
fn struct_hash_combines_every_field() {
    let mut arena = TypeArena::new();
    let id = packet(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let emitter = NativeEmitter::new(&arena, ErrorMode::Goto);

    let decl = render(|w| emitter.emit_equality_declarations(w, &plan));
    assert!(decl.contains("static inline size_t hash(const ::pkg::Packet& o);\n"));

    let out = render(|w| emitter.emit_equality_definitions(w, &plan));
    let expected = "\
static inline size_t hash(const ::pkg::Packet& o) {
    size_t _hidl_hash = 0;
    _hidl_hash ^= std::hash<int32_t>{}(o.x) + 0x9e3779b9 + (_hidl_hash << 6) + (_hidl_hash >> 2);
    for (size_t _hidl_index_0 = 0; _hidl_index_0 < o.y.size(); ++_hidl_index_0) {
        _hidl_hash ^= std::hash<uint8_t>{}(o.y[_hidl_index_0]) + 0x9e3779b9 + (_hidl_hash << 6) + (_hidl_hash >> 2);
    }
    _hidl_hash ^= std::hash<uint8_t>{}(o.z) + 0x9e3779b9 + (_hidl_hash << 6) + (_hidl_hash >> 2);
    return _hidl_hash;
}
";
    assert!(out.ends_with(expected), "{out}");
}

#[test]
fn union_has_no_hash() {
    let mut arena = TypeArena::new();
    let i32_id = arena.add_scalar(ScalarKind::Int32);
    let id = define(&mut arena, "pkg::Choice", Style::Union, vec![field("i", i32_id)]);
    let plan = MarshalPlan::build(&arena, id);
    let emitter = NativeEmitter::new(&arena, ErrorMode::Goto);

    assert!(!render(|w| emitter.emit_equality_declarations(w, &plan)).contains("size_t hash("));
    assert!(!render(|w| emitter.emit_equality_definitions(w, &plan)).contains("_hidl_hash"));
}

#[test]
fn to_string_lists_fields_in_order() {
    let mut arena = TypeArena::new();
    let id = packet(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let out = render(|w| NativeEmitter::new(&arena, ErrorMode::Goto).emit_to_string(w, &plan));

    let x = out.find("os += \".x = \";").expect("x");
    let y = out.find("os += \", .y = \";").expect("y");
    let z = out.find("os += \", .z = \";").expect("z");
    assert!(x < y && y < z);
}

#[test]
fn flat_writer_emits_buffer_then_embedded_pass() {
    let mut arena = TypeArena::new();
    let id = packet(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let out = render(|w| {
        NativeEmitter::new(&arena, ErrorMode::Goto).emit_reader_writer(w, &plan, "obj", "parcel", false);
    });

    let expected = "\
size_t _hidl_obj_parent;

_hidl_err = parcel.writeBuffer(&obj, sizeof(obj), &_hidl_obj_parent);
if (_hidl_err != ::android::OK) { goto _hidl_error; }

_hidl_err = writeEmbeddedToParcel(
        obj,
        parcel,
        _hidl_obj_parent,
        0 /* parentOffset */);
if (_hidl_err != ::android::OK) { goto _hidl_error; }

";
    assert_eq!(out, expected);
}

#[test]
fn flat_reader_maps_pointer_into_parcel() {
    let mut arena = TypeArena::new();
    let id = packet(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    assert!(NativeEmitter::result_needs_deref(&plan));
    let out = render(|w| {
        NativeEmitter::new(&arena, ErrorMode::Return).emit_reader_writer(w, &plan, "obj", "parcel", true);
    });

    assert!(out.contains(
        "_hidl_err = parcel.readBuffer(sizeof(*obj), &_hidl_obj_parent,  reinterpret_cast<const void **>(&obj));"
    ));
    assert!(out.contains("const_cast<::pkg::Packet &>((*obj))"));
    assert!(out.contains("if (_hidl_err != ::android::OK) { return _hidl_err; }"));
}

#[test]
fn all_three_passes_share_parent_handle_and_offsets() {
    let mut arena = TypeArena::new();
    let id = blob(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let emitter = NativeEmitter::new(&arena, ErrorMode::Goto);

    let top = render(|w| emitter.emit_reader_writer(w, &plan, "obj", "parcel", false));
    let buffer = top.find("parcel.writeBuffer(&obj").expect("pass 1");
    let embedded = top.find("writeEmbeddedToParcel(").expect("pass 2");
    let references = top.find("writeEmbeddedReferenceToParcel(").expect("pass 3");
    assert!(buffer < embedded && embedded < references);
    assert_eq!(top.matches("        _hidl_obj_parent,\n").count(), 2);

    let source = render(|w| emitter.emit_source(w, &plan));
    let split = source
        .find("::android::status_t readEmbeddedReferenceFromParcel(")
        .expect("reference definitions");
    let (embedded_defs, reference_defs) = source.split_at(split);
    assert!(embedded_defs.contains("parentOffset + offsetof(::pkg::Blob, payload)"));
    assert!(reference_defs.contains("        parentOffset + offsetof(::pkg::Blob, ptr),\n"));
    assert!(!reference_defs.contains("offsetof(::pkg::Blob, payload)"));
    assert!(reference_defs.contains("::android::hardware::writeEmbeddedReferenceToParcel("));
}

#[test]
fn nested_compound_uses_one_offset_in_both_passes() {
    let mut arena = TypeArena::new();
    let inner = blob(&mut arena);
    let u8_id = arena.add_scalar(ScalarKind::Uint8);
    let id = define(
        &mut arena,
        "pkg::Outer",
        Style::Struct,
        vec![field("tag", u8_id), field("blob", inner)],
    );
    let plan = MarshalPlan::build(&arena, id);
    let source = render(|w| NativeEmitter::new(&arena, ErrorMode::Goto).emit_source(w, &plan));

    let offset = NativeEmitter::field_offset(&plan, "blob");
    assert_eq!(offset, "parentOffset + offsetof(::pkg::Outer, blob)");
    let split = source
        .find("::android::status_t readEmbeddedReferenceFromParcel(")
        .expect("reference definitions");
    let (embedded_defs, reference_defs) = source.split_at(split);
    let argument = format!("        parentHandle,\n        {offset});\n");
    assert_eq!(embedded_defs.matches(&argument).count(), 2);
    assert_eq!(reference_defs.matches(&argument).count(), 2);
}

#[test]
fn embedded_definitions_walk_string_arrays() {
    let mut arena = TypeArena::new();
    let string = arena.add_string();
    let names = arena.add_array(string, 3);
    let id = define(&mut arena, "pkg::Names", Style::Struct, vec![field("items", names)]);
    let plan = MarshalPlan::build(&arena, id);
    let out = render(|w| NativeEmitter::new(&arena, ErrorMode::Goto).emit_embedded_definitions(w, &plan));

    assert!(out.contains("for (size_t _hidl_index_0 = 0; _hidl_index_0 < 3; ++_hidl_index_0) {"));
    assert!(out.contains(
        "parentOffset + offsetof(::pkg::Names, items) + _hidl_index_0 * sizeof(::android::hardware::hidl_string));"
    ));
    assert!(out.contains("const_cast<::android::hardware::hidl_string &>(obj.items[_hidl_index_0])"));
    assert_eq!(out.matches("_hidl_error:\n").count(), 2);
}

#[test]
fn live_path_decomposes_fields() {
    let mut arena = TypeArena::new();
    let cb = arena.add_interface("pkg::ICallback").expect("interface");
    let i32_id = arena.add_scalar(ScalarKind::Int32);
    let string = arena.add_string();
    let id = define(
        &mut arena,
        "pkg::Session",
        Style::Struct,
        vec![field("id", i32_id), field("name", string), field("cb", cb)],
    );
    let plan = MarshalPlan::build(&arena, id);
    assert!(!NativeEmitter::result_needs_deref(&plan));
    let emitter = NativeEmitter::new(&arena, ErrorMode::Goto);

    let writer = render(|w| emitter.emit_reader_writer(w, &plan, "obj", "parcel", false));
    assert!(writer.contains("_hidl_err = parcel.writeInt32(obj.id);"));
    assert!(writer.contains("_hidl_err = parcel.writeBuffer(&obj.name, sizeof(obj.name), &_hidl_obj_name_parent);"));
    assert!(writer.contains("::android::hardware::getOrCreateCachedBinder(obj.cb.get());"));
    assert!(!writer.contains("writeBuffer(&obj,"));

    let reader = render(|w| emitter.emit_reader_writer(w, &plan, "obj", "parcel", true));
    assert!(reader.contains("_hidl_err = parcel.readInt32(&obj.id);"));
    assert!(reader.contains("::android::hardware::hidl_string const *_hidl_obj_name_ptr;"));
    assert!(reader.contains("obj.name = *_hidl_obj_name_ptr;"));
    assert!(reader.contains("obj.cb = ::android::hardware::fromBinder<::pkg::ICallback>(_hidl_binder);"));

    let source = render(|w| emitter.emit_source(w, &plan));
    assert_eq!(source, "");
}

#[test]
#[should_panic(expected = "does not need reference resolution")]
fn reference_definitions_require_reference_pass() {
    let mut arena = TypeArena::new();
    let id = packet(&mut arena);
    let plan = MarshalPlan::build(&arena, id);
    let mut w = SourceWriter::new();
    NativeEmitter::new(&arena, ErrorMode::Goto).emit_reference_definitions(&mut w, &plan);
}
