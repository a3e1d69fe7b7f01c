// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Generator configuration.
//!
//! Loaded from an optional YAML file, then overridden field by field by the
//! command line.

use anyhow::{Context, Result};
use hidl_compound::ErrorMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `types.h` + `types.cpp`
    Native,
    /// One `.java` file per compound
    Managed,
    /// `types.vts` test descriptor
    Descriptor,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Native, Backend::Managed, Backend::Descriptor];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Overrides the `package:` line of the schema.
    pub package: Option<String>,
    pub backends: Vec<Backend>,
    pub error_mode: ErrorMode,
    pub output_dir: PathBuf,
    /// Abort on the first rejected type instead of skipping it.
    pub fail_fast: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: None,
            backends: Backend::ALL.to_vec(),
            error_mode: ErrorMode::default(),
            output_dir: PathBuf::from("out"),
            fail_fast: false,
        }
    }
}

impl GeneratorConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid generator configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("In {}", path.display()))
    }

    pub fn wants(&self, backend: Backend) -> bool {
        self.backends.contains(&backend)
    }
}
