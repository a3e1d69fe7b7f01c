// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! YAML type schema and its lowering into a [`TypeArena`].
//!
//! ```yaml
//! package: android.hardware.example@1.0
//! file: types.hal
//! types:
//!   - name: ICallback
//!     kind: interface
//!   - name: Packet
//!     kind: struct
//!     line: 10
//!     fields:
//!       - { name: x, type: int32, line: 11 }
//!       - { name: y, type: { vec: uint8 }, line: 12 }
//!       - { name: z, type: { array: float, len: 4 }, line: 13 }
//! ```
//!
//! Lowering runs in two phases so that fields may name types declared later
//! in the file, including the enclosing compound itself.

use anyhow::{anyhow, bail, Context, Result};
use hidl_compound::{NamedReference, ScalarKind, SourceLocation, Style, TypeArena, TypeId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

fn default_file() -> String {
    "types.hal".to_string()
}

/// Root document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub package: String,
    /// File name reported in diagnostics.
    #[serde(default = "default_file")]
    pub file: String,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Struct,
    Union,
    Enum,
    Interface,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: DeclKind,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Enum storage type, `int32` when absent.
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// A field type: a name, or one level of vector / array / ref around another.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    Named(String),
    Vector { vec: Box<TypeExpr> },
    Array { array: Box<TypeExpr>, len: usize },
    Ref {
        #[serde(rename = "ref")]
        target: Box<TypeExpr>,
    },
}

/// `a.b.c@1.0`, split into its native namespace components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub namespace: Vec<String>,
    pub version: Option<(u32, u32)>,
}

impl Package {
    /// `android::hardware::example::V1_0`
    pub fn cpp_namespace(&self) -> String {
        self.namespace.join("::")
    }

    /// `android.hardware.example.V1_0`
    pub fn java_package(&self) -> String {
        self.namespace.join(".")
    }

    pub fn qualify(&self, local: &str) -> String {
        if self.namespace.is_empty() {
            local.to_string()
        } else {
            format!("{}::{}", self.cpp_namespace(), local)
        }
    }
}

/// Fully lowered schema, ready for validation and emission.
#[derive(Debug, Clone)]
pub struct Model {
    pub package: Package,
    pub arena: TypeArena,
    /// Structs and unions in declaration order.
    pub compounds: Vec<TypeId>,
}

struct Names {
    ident: Regex,
    package: Regex,
}

impl Names {
    fn new() -> Result<Self> {
        Ok(Self {
            ident: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?,
            package: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)(?:@([0-9]+)\.([0-9]+))?$")?,
        })
    }

    fn check_ident(&self, what: &str, name: &str) -> Result<()> {
        if self.ident.is_match(name) {
            Ok(())
        } else {
            bail!("invalid {what} name `{name}`")
        }
    }

    fn parse_package(&self, text: &str) -> Result<Package> {
        let caps = self
            .package
            .captures(text)
            .ok_or_else(|| anyhow!("invalid package `{text}` (expected a.b.c@MAJOR.MINOR)"))?;
        let mut namespace: Vec<String> = caps[1].split('.').map(str::to_string).collect();
        let version = match (caps.get(2), caps.get(3)) {
            (Some(major), Some(minor)) => {
                let major: u32 = major.as_str().parse().context("package major version")?;
                let minor: u32 = minor.as_str().parse().context("package minor version")?;
                namespace.push(format!("V{major}_{minor}"));
                Some((major, minor))
            }
            _ => None,
        };
        Ok(Package {
            name: text.to_string(),
            namespace,
            version,
        })
    }
}

impl Schema {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid type schema")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("In {}", path.display()))
    }

    /// Lower into an arena, optionally under a different package.
    pub fn build(&self, package_override: Option<&str>) -> Result<Model> {
        let names = Names::new()?;
        let package = names.parse_package(package_override.unwrap_or(&self.package))?;
        let file: Arc<str> = Arc::from(self.file.as_str());
        let mut arena = TypeArena::new();
        let mut compounds = Vec::new();

        // Phase 1: every named type gets an id.
        for decl in &self.types {
            names.check_ident("type", &decl.name)?;
            let qualified = package.qualify(&decl.name);
            let at = SourceLocation::new(file.clone(), decl.line, 1);
            let result = match decl.kind {
                DeclKind::Interface => arena.add_interface(&qualified),
                DeclKind::Enum => {
                    let storage = enum_storage(decl.storage.as_deref())
                        .with_context(|| format!("{at}: enum `{}`", decl.name))?;
                    arena.add_enum(&qualified, storage)
                }
                DeclKind::Struct => arena
                    .declare_compound(&qualified, Style::Struct, at.clone())
                    .inspect(|id| compounds.push(*id)),
                DeclKind::Union => arena
                    .declare_compound(&qualified, Style::Union, at.clone())
                    .inspect(|id| compounds.push(*id)),
            };
            result.with_context(|| format!("{at}: declaring `{}`", decl.name))?;

            if !decl.fields.is_empty() && matches!(decl.kind, DeclKind::Enum | DeclKind::Interface) {
                warn!("{at}: fields of `{}` ignored", decl.name);
            }
        }

        // Phase 2: resolve field types against the complete set of names.
        for decl in &self.types {
            if !matches!(decl.kind, DeclKind::Struct | DeclKind::Union) {
                continue;
            }
            let id = arena
                .lookup(&package.qualify(&decl.name))
                .ok_or_else(|| anyhow!("`{}` vanished between phases", decl.name))?;
            let mut fields = Vec::with_capacity(decl.fields.len());
            for field in &decl.fields {
                let at = SourceLocation::new(file.clone(), field.line, field.column);
                names
                    .check_ident("field", &field.name)
                    .with_context(|| format!("{at}: in `{}`", decl.name))?;
                let type_id = resolve(&mut arena, &package, &field.ty)
                    .with_context(|| format!("{at}: field `{}` of `{}`", field.name, decl.name))?;
                fields.push(NamedReference::new(field.name.clone(), type_id, at));
            }
            arena.define_fields(id, fields);
        }

        debug!("lowered {} types ({} compounds) for {}", self.types.len(), compounds.len(), package.name);
        Ok(Model {
            package,
            arena,
            compounds,
        })
    }
}

fn enum_storage(storage: Option<&str>) -> Result<ScalarKind> {
    let keyword = storage.unwrap_or("int32");
    match ScalarKind::from_keyword(keyword) {
        Some(kind @ (ScalarKind::Bool | ScalarKind::Float | ScalarKind::Double)) => {
            bail!("storage `{}` is not an integer type", kind.keyword())
        }
        Some(kind) => Ok(kind),
        None => bail!("unknown storage type `{keyword}`"),
    }
}

fn resolve(arena: &mut TypeArena, package: &Package, expr: &TypeExpr) -> Result<TypeId> {
    match expr {
        TypeExpr::Named(name) => {
            if let Some(kind) = ScalarKind::from_keyword(name) {
                return Ok(arena.add_scalar(kind));
            }
            if name == "string" {
                return Ok(arena.add_string());
            }
            arena
                .lookup(&package.qualify(name))
                .or_else(|| arena.lookup(name.trim_start_matches("::")))
                .ok_or_else(|| anyhow!("unknown type `{name}`"))
        }
        TypeExpr::Vector { vec } => {
            let element = resolve(arena, package, vec)?;
            Ok(arena.add_vector(element))
        }
        TypeExpr::Array { array, len } => {
            if *len == 0 {
                bail!("array length must be at least 1");
            }
            let element = resolve(arena, package, array)?;
            Ok(arena.add_array(element, *len))
        }
        TypeExpr::Ref { target } => {
            let target = resolve(arena, package, target)?;
            Ok(arena.add_ref(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidl_compound::TypeKind;

    const SAMPLE: &str = r#"
package: android.hardware.example@1.0
types:
  - name: Packet
    kind: struct
    line: 3
    fields:
      - { name: x, type: int32, line: 4 }
      - { name: y, type: { vec: uint8 }, line: 5 }
      - { name: next, type: { ref: Packet }, line: 6 }
      - { name: color, type: Color, line: 7 }
      - { name: grid, type: { array: { array: float, len: 2 }, len: 3 }, line: 8 }
  - name: Color
    kind: enum
    storage: uint8
"#;

    #[test]
    fn test_package_namespace() {
        let names = Names::new().unwrap();
        let package = names.parse_package("android.hardware.example@1.0").unwrap();
        assert_eq!(package.cpp_namespace(), "android::hardware::example::V1_0");
        assert_eq!(package.java_package(), "android.hardware.example.V1_0");
        assert_eq!(package.version, Some((1, 0)));

        let bare = names.parse_package("pkg").unwrap();
        assert_eq!(bare.qualify("T"), "pkg::T");
        assert!(names.parse_package("bad-name@1").is_err());
    }

    #[test]
    fn test_forward_and_self_references_resolve() {
        let model = Schema::from_yaml(SAMPLE).unwrap().build(None).unwrap();
        assert_eq!(model.compounds.len(), 1);

        let packet = model.compounds[0];
        let compound = model.arena.compound(packet).unwrap();
        assert_eq!(compound.name(), "android::hardware::example::V1_0::Packet");
        assert_eq!(compound.fields().len(), 5);

        let next = compound.fields()[2].type_id();
        assert_eq!(model.arena.get(next), &TypeKind::Ref(packet));
        let color = compound.fields()[3].type_id();
        assert!(matches!(model.arena.get(color), TypeKind::Enum { storage: ScalarKind::Uint8, .. }));
        let grid = compound.fields()[4].type_id();
        assert!(matches!(model.arena.get(grid), TypeKind::Array { len: 3, .. }));
        assert_eq!(compound.fields()[1].location().to_string(), "types.hal:5:0");
    }

    #[test]
    fn test_unknown_type_reports_location() {
        let yaml = "package: p\ntypes:\n  - name: T\n    kind: struct\n    fields:\n      - { name: a, type: Missing, line: 9 }\n";
        let err = Schema::from_yaml(yaml).unwrap().build(None).unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("types.hal:9:0"), "{text}");
        assert!(text.contains("unknown type `Missing`"), "{text}");
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let yaml = "package: p\ntypes:\n  - { name: T, kind: struct }\n  - { name: T, kind: union }\n";
        let err = Schema::from_yaml(yaml).unwrap().build(None).unwrap_err();
        assert!(format!("{err:#}").contains("already defined"));
    }

    #[test]
    fn test_bad_identifiers_and_storage() {
        let yaml = "package: p\ntypes:\n  - { name: 9lives, kind: struct }\n";
        assert!(Schema::from_yaml(yaml).unwrap().build(None).is_err());

        let yaml = "package: p\ntypes:\n  - { name: E, kind: enum, storage: float }\n";
        assert!(Schema::from_yaml(yaml).unwrap().build(None).is_err());

        let yaml = "package: p\ntypes:\n  - name: T\n    kind: struct\n    fields:\n      - { name: a, type: { array: int8, len: 0 } }\n";
        assert!(Schema::from_yaml(yaml).unwrap().build(None).is_err());
    }

    #[test]
    fn test_package_override() {
        let model = Schema::from_yaml(SAMPLE).unwrap().build(Some("vendor.acme@2.1")).unwrap();
        assert_eq!(model.package.cpp_namespace(), "vendor::acme::V2_1");
        assert!(model.arena.lookup("vendor::acme::V2_1::Packet").is_some());
    }
}
