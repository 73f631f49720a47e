// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Project manifest parsing.
//!
//! **DDD Context:** Build System
//!
//! An optional `sona.toml` in the project root configures code generation:
//!
//! ```toml
//! [transpile]
//! runtime_module = "sona.runtime"   # "" disables the runtime import
//! header = true
//! source_maps = true
//! line_width = 88
//! indent_width = 4
//! ```
//!
//! Every key is optional; absent keys keep the built-in defaults and
//! command-line flags override whatever the manifest says.

use camino::Utf8Path;
use ecow::EcoString;
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;
use sona_core::codegen::python::CodegenOptions;
use std::fs;

/// File name of the manifest.
pub const MANIFEST_FILE: &str = "sona.toml";

/// The top-level manifest structure parsed from `sona.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// The `[transpile]` section.
    #[serde(default)]
    pub transpile: TranspileSettings,
}

/// Code generation settings from the `[transpile]` section.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranspileSettings {
    /// Runtime module; an empty string disables the import.
    pub runtime_module: Option<String>,
    /// Whether to emit the generated-file header.
    pub header: Option<bool>,
    /// Whether to produce source maps.
    pub source_maps: Option<bool>,
    /// Target line width.
    pub line_width: Option<usize>,
    /// Spaces per indentation level.
    pub indent_width: Option<usize>,
}

impl TranspileSettings {
    /// Applies the settings present in the manifest to `options`.
    #[must_use]
    pub fn apply(&self, mut options: CodegenOptions) -> CodegenOptions {
        if let Some(module) = &self.runtime_module {
            options = options.with_runtime_module(runtime_module(module));
        }
        if let Some(header) = self.header {
            options = options.with_header(header);
        }
        if let Some(source_maps) = self.source_maps {
            options = options.with_source_maps(source_maps);
        }
        if let Some(width) = self.line_width {
            options = options.with_line_width(width);
        }
        if let Some(width) = self.indent_width {
            options = options.with_indent_width(width);
        }
        options
    }
}

/// An empty module name means "no runtime import".
#[must_use]
pub fn runtime_module(name: &str) -> Option<EcoString> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.into())
}

/// Parse a `sona.toml` manifest file.
///
/// Returns an error if the file cannot be read or contains invalid TOML or
/// unknown keys.
pub fn parse_manifest(path: &Utf8Path) -> Result<TranspileSettings> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read manifest '{path}'"))?;

    let manifest: Manifest = toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse manifest '{path}'"))?;

    Ok(manifest.transpile)
}

/// Look for `sona.toml` in the given directory and parse it if found.
///
/// Returns `None` if no manifest file exists.
pub fn find_manifest(project_root: &Utf8Path) -> Result<Option<TranspileSettings>> {
    let manifest_path = project_root.join(MANIFEST_FILE);
    if manifest_path
        .try_exists()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to stat manifest '{manifest_path}'"))?
    {
        parse_manifest(&manifest_path).map(Some)
    } else {
        Ok(None)
    }
}
