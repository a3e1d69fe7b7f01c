// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Generation pipeline: validate every compound, plan the survivors, render
//! each enabled backend through its file template and write the results.

use crate::config::{Backend, GeneratorConfig};
use crate::schema::Model;
use crate::templates;
use anyhow::{bail, Context, Result};
use hidl_compound::properties::buffers_interface;
use hidl_compound::{
    validate, ClassScope, DescriptorEmitter, ManagedEmitter, MarshalPlan, NativeEmitter, SourceWriter, TypeArena,
    TypeId, TypeKind, VisitSet,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transport buffers carry 32-bit sizes.
const MAX_INLINE_SIZE: u64 = u32::MAX as u64;

/// A compound left out of the generated sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub name: String,
    pub reason: String,
}

/// Outcome of validating every compound in a model.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Accepted compounds, ordered so that by-value members come first.
    pub accepted: Vec<TypeId>,
    pub rejected: Vec<Rejection>,
}

/// Validate each compound on its own, reject the ones no backend can
/// marshal (interface handles inside a buffer, 32-bit size overflow), then
/// drop compounds that refer to a rejected one: their generated code would
/// name a type that never gets declared.
pub fn analyze(model: &Model, fail_fast: bool) -> Result<Analysis> {
    let arena = &model.arena;
    let mut rejected: BTreeMap<TypeId, String> = BTreeMap::new();
    let mut sizes = HashMap::new();

    for &id in &model.compounds {
        if let Err(err) = validate(arena, id) {
            tracing::warn!("{err}");
            if fail_fast {
                bail!("{err}");
            }
            rejected.insert(id, err.to_string());
            continue;
        }
        let buffered = arena.compound(id).and_then(|compound| {
            compound
                .fields()
                .iter()
                .find(|field| buffers_interface(arena, field.type_id()))
                .map(|field| (compound, field))
        });
        if let Some((compound, field)) = buffered {
            let reason = format!(
                "{}: field `{}` of `{}` holds interface handles inside a buffer",
                field.location(),
                field.name(),
                compound.name()
            );
            tracing::warn!("{reason}");
            if fail_fast {
                bail!("{reason}");
            }
            rejected.insert(id, reason);
            continue;
        }
        if size_bound(arena, id, &mut sizes).map_or(true, |bound| bound > MAX_INLINE_SIZE) {
            let reason = match arena.compound(id) {
                Some(compound) => format!("{}: `{}` is too large to lay out", compound.location(), compound.name()),
                None => format!("`{}` is too large to lay out", arena.display_name(id)),
            };
            tracing::warn!("{reason}");
            if fail_fast {
                bail!("{reason}");
            }
            rejected.insert(id, reason);
        }
    }

    loop {
        let mut changed = false;
        for &id in &model.compounds {
            if rejected.contains_key(&id) {
                continue;
            }
            let culprit = referenced_compounds(arena, id)
                .into_iter()
                .find(|dep| rejected.contains_key(dep));
            if let Some(dep) = culprit {
                let reason = format!(
                    "`{}` refers to rejected type `{}`",
                    arena.display_name(id),
                    arena.display_name(dep)
                );
                tracing::warn!("{reason}");
                if fail_fast {
                    bail!("{reason}");
                }
                rejected.insert(id, reason);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let survivors: Vec<TypeId> = model
        .compounds
        .iter()
        .copied()
        .filter(|id| !rejected.contains_key(id))
        .collect();

    Ok(Analysis {
        accepted: declaration_order(arena, &survivors),
        rejected: model
            .compounds
            .iter()
            .filter_map(|id| {
                rejected.get(id).map(|reason| Rejection {
                    name: arena.display_name(*id),
                    reason: reason.clone(),
                })
            })
            .collect(),
    })
}

/// Upper bound on the inline size of `id`, counting worst-case padding.
/// `None` on overflow. Only called on compounds free of by-value cycles.
fn size_bound(arena: &TypeArena, id: TypeId, memo: &mut HashMap<TypeId, Option<u64>>) -> Option<u64> {
    if let Some(known) = memo.get(&id) {
        return *known;
    }
    let bound = match arena.get(id) {
        TypeKind::Scalar(kind) | TypeKind::Enum { storage: kind, .. } => Some(kind.width() as u64),
        TypeKind::String | TypeKind::Vector(_) => Some(16),
        TypeKind::Ref(_) | TypeKind::Interface { .. } => Some(8),
        TypeKind::Array { element, len } => {
            size_bound(arena, *element, memo).and_then(|size| size.checked_mul(*len as u64))
        }
        TypeKind::Compound(compound) => compound.fields().iter().try_fold(8u64, |total, field| {
            let size = size_bound(arena, field.type_id(), memo)?;
            total.checked_add(size)?.checked_add(8)
        }),
    };
    memo.insert(id, bound);
    bound
}

/// Compounds named by the fields of `id`, through any wrapper.
fn referenced_compounds(arena: &TypeArena, id: TypeId) -> Vec<TypeId> {
    fn walk(arena: &TypeArena, id: TypeId, out: &mut Vec<TypeId>) {
        match arena.get(id) {
            TypeKind::Vector(inner) | TypeKind::Ref(inner) | TypeKind::Array { element: inner, .. } => {
                walk(arena, *inner, out)
            }
            TypeKind::Compound(_) => out.push(id),
            _ => {}
        }
    }

    let mut out = Vec::new();
    if let Some(compound) = arena.compound(id) {
        for field in compound.fields() {
            walk(arena, field.type_id(), &mut out);
        }
    }
    out
}

/// Compounds held by value (directly or as array elements).
fn by_value_members(arena: &TypeArena, id: TypeId) -> Vec<TypeId> {
    fn walk(arena: &TypeArena, id: TypeId, out: &mut Vec<TypeId>) {
        match arena.get(id) {
            TypeKind::Array { element, .. } => walk(arena, *element, out),
            TypeKind::Compound(_) => out.push(id),
            _ => {}
        }
    }

    let mut out = Vec::new();
    if let Some(compound) = arena.compound(id) {
        for field in compound.fields() {
            walk(arena, field.type_id(), &mut out);
        }
    }
    out
}

/// Depth-first post-order over by-value edges, starting from each compound
/// in declaration order.
fn declaration_order(arena: &TypeArena, ids: &[TypeId]) -> Vec<TypeId> {
    fn visit(arena: &TypeArena, id: TypeId, keep: &[TypeId], seen: &mut VisitSet, out: &mut Vec<TypeId>) {
        if !keep.contains(&id) || !seen.insert(id) {
            return;
        }
        for member in by_value_members(arena, id) {
            visit(arena, member, keep, seen, out);
        }
        out.push(id);
    }

    let mut seen = VisitSet::with_capacity(arena.len());
    let mut out = Vec::with_capacity(ids.len());
    for &id in ids {
        visit(arena, id, ids, &mut seen, &mut out);
    }
    out
}

/// One rendered output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Generation report
#[derive(Debug, Default, Serialize)]
pub struct GenerationReport {
    pub files_generated: Vec<String>,
    pub valid_types: Vec<String>,
    pub rejected_types: Vec<Rejection>,
    /// Valid compounds that have no Java representation.
    pub managed_skipped: Vec<String>,
}

impl GenerationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("  hidl-gen Generation Report");
        println!("{}", "=".repeat(60));
        println!();
        println!("  [OK] Valid types:     {}", self.valid_types.len());
        println!("  [OK] Files written:   {}", self.files_generated.len());
        if !self.managed_skipped.is_empty() {
            println!("  [--] No Java class:   {}", self.managed_skipped.len());
            for name in &self.managed_skipped {
                println!("    - {name}");
            }
        }
        if !self.rejected_types.is_empty() {
            println!("  [ERROR] Rejected:     {}", self.rejected_types.len());
            for rejection in &self.rejected_types {
                println!("    - {}", rejection.reason);
            }
        }
        println!();
        println!("{}", "=".repeat(60));
    }
}

pub struct Generator {
    config: GeneratorConfig,
    tera: Tera,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template("native_header", templates::NATIVE_HEADER)
            .context("Failed to parse native header template")?;
        tera.add_raw_template("native_source", templates::NATIVE_SOURCE)
            .context("Failed to parse native source template")?;
        tera.add_raw_template("managed_class", templates::MANAGED_CLASS)
            .context("Failed to parse managed class template")?;
        tera.add_raw_template("descriptor", templates::DESCRIPTOR)
            .context("Failed to parse descriptor template")?;
        Ok(Self { config, tera })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render every enabled backend without touching the filesystem.
    pub fn render(&self, model: &Model, source: &str) -> Result<(Vec<GeneratedFile>, GenerationReport)> {
        let mut report = GenerationReport::new();
        let analysis = analyze(model, self.config.fail_fast)?;
        report.rejected_types = analysis.rejected;

        let plans: Vec<MarshalPlan> = analysis
            .accepted
            .iter()
            .map(|&id| MarshalPlan::build(&model.arena, id))
            .collect();
        report.valid_types = plans.iter().map(|plan| plan.name.clone()).collect();

        let mut files = Vec::new();
        if self.config.wants(Backend::Native) {
            files.extend(self.render_native(model, &plans, source)?);
        }
        if self.config.wants(Backend::Managed) {
            files.extend(self.render_managed(model, &plans, source, &mut report)?);
        }
        if self.config.wants(Backend::Descriptor) {
            files.push(self.render_descriptor(model, &plans, source)?);
        }
        report.files_generated = files.iter().map(|file| file.path.display().to_string()).collect();
        Ok((files, report))
    }

    /// Render, write every file under the configured output directory and
    /// record a `manifest.json` next to them.
    pub fn generate(&self, model: &Model, source: &str) -> Result<GenerationReport> {
        tracing::info!("Generating {} into {}", model.package.name, self.config.output_dir.display());
        let (files, report) = self.render(model, source)?;

        for file in &files {
            let path = self.config.output_dir.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, &file.contents).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!("wrote {}", path.display());
        }
        self.write_manifest(model, source, &report)?;

        tracing::info!("[OK] Generated {} files", report.files_generated.len());
        Ok(report)
    }

    fn write_manifest(&self, model: &Model, source: &str, report: &GenerationReport) -> Result<()> {
        fs::create_dir_all(&self.config.output_dir).context("Failed to create output directory")?;
        let manifest = serde_json::json!({
            "generated_date": chrono::Local::now().to_rfc3339(),
            "generator_version": VERSION,
            "source": source,
            "package": model.package.name,
            "error_mode": self.config.error_mode,
            "report": report,
        });
        let path = self.config.output_dir.join("manifest.json");
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn base_context(&self, model: &Model, source: &str) -> tera::Context {
        let mut ctx = tera::Context::new();
        ctx.insert("version", VERSION);
        ctx.insert("source", source);
        ctx.insert("namespaces", &model.package.namespace);
        ctx
    }

    fn render_native(&self, model: &Model, plans: &[MarshalPlan], source: &str) -> Result<Vec<GeneratedFile>> {
        let emitter = NativeEmitter::new(&model.arena, self.config.error_mode);
        let guard = format!("HIDL_GENERATED_{}_TYPES_H", model.package.namespace.join("_").to_uppercase());
        let mut ctx = self.base_context(model, source);
        ctx.insert("guard", &guard);
        ctx.insert("forward_declarations", &forward_declarations(model, plans));
        ctx.insert("declarations", &render_each(plans, |w, plan| emitter.emit_header(w, plan)));
        ctx.insert("inline_definitions", &render_each(plans, |w, plan| emitter.emit_inline_definitions(w, plan)));
        let header = self
            .tera
            .render("native_header", &ctx)
            .context("Failed to render types.h")?;

        let mut ctx = self.base_context(model, source);
        ctx.insert("header", "types.h");
        ctx.insert("definitions", &render_each(plans, |w, plan| emitter.emit_source(w, plan)));
        let body = self
            .tera
            .render("native_source", &ctx)
            .context("Failed to render types.cpp")?;

        Ok(vec![
            GeneratedFile {
                path: PathBuf::from("types.h"),
                contents: header,
            },
            GeneratedFile {
                path: PathBuf::from("types.cpp"),
                contents: body,
            },
        ])
    }

    fn render_managed(
        &self,
        model: &Model,
        plans: &[MarshalPlan],
        source: &str,
        report: &mut GenerationReport,
    ) -> Result<Vec<GeneratedFile>> {
        let emitter = ManagedEmitter::new(&model.arena);
        let java_package = model.package.java_package();
        let dir: PathBuf = Path::new("java").join(java_package.replace('.', "/"));

        let mut files = Vec::new();
        for plan in plans {
            let mut w = SourceWriter::new();
            if let Err(err) = emitter.emit_class(&mut w, plan, ClassScope::TopLevel) {
                tracing::info!("{err}, skipping Java class");
                report.managed_skipped.push(plan.name.clone());
                continue;
            }
            let local = plan.name.rsplit("::").next().unwrap_or(&plan.name);
            let mut ctx = self.base_context(model, source);
            ctx.insert("java_package", &java_package);
            ctx.insert("body", &w.finish());
            let contents = self
                .tera
                .render("managed_class", &ctx)
                .with_context(|| format!("Failed to render {local}.java"))?;
            files.push(GeneratedFile {
                path: dir.join(format!("{local}.java")),
                contents,
            });
        }
        Ok(files)
    }

    fn render_descriptor(&self, model: &Model, plans: &[MarshalPlan], source: &str) -> Result<GeneratedFile> {
        let emitter = DescriptorEmitter::new(&model.arena);
        let attributes: Vec<String> = plans
            .iter()
            .map(|plan| {
                let mut w = SourceWriter::new();
                emitter.emit_attribute(&mut w, plan);
                w.finish()
            })
            .collect();
        let (major, minor) = model.package.version.unwrap_or((1, 0));
        let package_name = model.package.name.split('@').next().unwrap_or(&model.package.name);

        let mut ctx = self.base_context(model, source);
        ctx.insert("major", &major);
        ctx.insert("minor", &minor);
        ctx.insert("package", package_name);
        ctx.insert("attributes", &attributes);
        let contents = self
            .tera
            .render("descriptor", &ctx)
            .context("Failed to render types.vts")?;
        Ok(GeneratedFile {
            path: PathBuf::from("types.vts"),
            contents,
        })
    }
}

/// Run one emitter hook per plan, dropping hooks that produced nothing.
fn render_each(plans: &[MarshalPlan], hook: impl Fn(&mut SourceWriter, &MarshalPlan)) -> Vec<String> {
    plans
        .iter()
        .map(|plan| {
            let mut w = SourceWriter::new();
            hook(&mut w, plan);
            w.finish()
        })
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// Opaque enums, interface classes and every emitted compound, so that
/// pointers and vectors may name types declared further down.
fn forward_declarations(model: &Model, plans: &[MarshalPlan]) -> Vec<String> {
    let local = |name: &str| name.rsplit("::").next().unwrap_or(name).to_string();
    let prefix = format!("{}::", model.package.cpp_namespace());
    let mut out = Vec::new();

    for id in model.arena.ids() {
        match model.arena.get(id) {
            TypeKind::Enum { name, storage } if name.starts_with(&prefix) => {
                out.push(format!("enum class {} : {};", local(name), storage.native_name()));
            }
            TypeKind::Interface { name } if name.starts_with(&prefix) => {
                out.push(format!("struct {};", local(name)));
            }
            _ => {}
        }
    }
    for plan in plans {
        out.push(format!("{} {};", plan.layout.style, local(&plan.name)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn model(yaml: &str) -> Model {
        Schema::from_yaml(yaml).unwrap().build(None).unwrap()
    }

    #[test]
    fn test_by_value_members_are_declared_first() {
        let model = model(
            r#"
package: p
types:
  - name: Outer
    kind: struct
    fields:
      - { name: inner, type: { array: Inner, len: 2 } }
      - { name: later, type: { vec: Later } }
  - name: Inner
    kind: struct
    fields:
      - { name: a, type: int32 }
  - name: Later
    kind: struct
    fields:
      - { name: b, type: int8 }
"#,
        );
        let analysis = analyze(&model, false).unwrap();
        let names: Vec<String> = analysis.accepted.iter().map(|id| model.arena.display_name(*id)).collect();
        assert_eq!(names, vec!["p::Inner", "p::Outer", "p::Later"]);
        assert!(analysis.rejected.is_empty());
    }

    #[test]
    fn test_rejection_spreads_to_dependents_only() {
        let model = model(
            r#"
package: p
types:
  - name: Bad
    kind: union
    fields:
      - { name: s, type: string, line: 4 }
  - name: UsesBad
    kind: struct
    fields:
      - { name: b, type: { ref: Bad } }
  - name: Fine
    kind: struct
    fields:
      - { name: x, type: int64 }
"#,
        );
        let analysis = analyze(&model, false).unwrap();
        assert_eq!(analysis.accepted.len(), 1);
        assert_eq!(model.arena.display_name(analysis.accepted[0]), "p::Fine");
        assert_eq!(analysis.rejected.len(), 2);
        assert_eq!(analysis.rejected[0].name, "p::Bad");
        assert!(analysis.rejected[1].reason.contains("refers to rejected type `p::Bad`"));

        assert!(analyze(&model, true).is_err());
    }

    #[test]
    fn test_interfaces_behind_buffers_rejected() {
        let model = model(
            r#"
package: p
types:
  - { name: ICallback, kind: interface }
  - name: Holder
    kind: struct
    fields:
      - { name: cb, type: ICallback }
  - name: Outer
    kind: struct
    fields:
      - { name: id, type: int32, line: 8 }
      - { name: holders, type: { vec: Holder }, line: 9, column: 7 }
  - name: Pinned
    kind: struct
    fields:
      - { name: grid, type: { array: { ref: Holder }, len: 2 }, line: 12 }
"#,
        );
        let analysis = analyze(&model, false).unwrap();
        let accepted: Vec<String> = analysis.accepted.iter().map(|id| model.arena.display_name(*id)).collect();
        assert_eq!(accepted, vec!["p::Holder"]);
        assert_eq!(
            analysis.rejected[0].reason,
            "types.hal:9:7: field `holders` of `p::Outer` holds interface handles inside a buffer"
        );
        assert_eq!(analysis.rejected[1].name, "p::Pinned");
        assert!(analysis.rejected[1].reason.starts_with("types.hal:12:0: field `grid`"));

        let err = analyze(&model, true).unwrap_err();
        assert!(err.to_string().contains("holds interface handles inside a buffer"));
    }

    #[test]
    fn test_oversized_compound_rejected_before_layout() {
        let model = model(
            r#"
package: p
types:
  - name: Huge
    kind: struct
    line: 3
    fields:
      - { name: grid, type: { array: { array: int64, len: 100000 }, len: 100000 } }
  - name: Holder
    kind: struct
    fields:
      - { name: h, type: { vec: Huge } }
"#,
        );
        let analysis = analyze(&model, false).unwrap();
        assert!(analysis.accepted.is_empty());
        assert_eq!(analysis.rejected[0].reason, "types.hal:3:1: `p::Huge` is too large to lay out");
        assert!(analysis.rejected[1].reason.contains("refers to rejected type `p::Huge`"));
    }

    #[test]
    fn test_forward_declarations_cover_enums_and_interfaces() {
        let model = model(
            r#"
package: p
types:
  - { name: Mode, kind: enum, storage: uint16 }
  - { name: IListener, kind: interface }
  - name: U
    kind: union
    fields:
      - { name: m, type: Mode }
"#,
        );
        let plans: Vec<MarshalPlan> = model
            .compounds
            .iter()
            .map(|id| MarshalPlan::build(&model.arena, *id))
            .collect();
        let decls = forward_declarations(&model, &plans);
        assert_eq!(decls, vec!["enum class Mode : uint16_t;", "struct IListener;", "union U;"]);
    }
}
