// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! `hidl-gen`: load a YAML type schema, validate and lay out its compounds,
//! and write C++, Java and test-descriptor sources for them.

pub mod config;
pub mod generator;
pub mod schema;
mod templates;

pub use config::{Backend, GeneratorConfig};
pub use generator::{analyze, Analysis, GeneratedFile, GenerationReport, Generator, Rejection};
pub use schema::{Model, Package, Schema};
