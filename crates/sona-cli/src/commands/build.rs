// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Build and check Sona projects.
//!
//! **DDD Context:** Build System
//!
//! A path names either one `.sona` file or a project directory. Directories
//! are searched recursively (starting at `src/` when it exists). Generated
//! Python keeps the source layout under the output directory:
//!
//! ```text
//! src/app.sona        →  build/app.py   (+ build/app.py.map)
//! src/util/text.sona  →  build/util/text.py
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use sona_core::codegen::python::CodegenOptions;
use sona_core::transpiler::{TranspileError, TranspileOutput, TranspileReport, Transpiler};
use std::fs;
use tracing::{debug, error, info, instrument, warn};

use super::manifest;
use crate::diagnostic::{error_report, CompileDiagnostic};
use crate::OptionFlags;

/// Extension of Sona source files.
const SOURCE_EXTENSION: &str = "sona";

/// Transpile Sona source files and write the generated Python.
#[instrument(skip_all, fields(path = %path))]
pub fn build(path: &str, out_dir: Option<&str>, flags: &OptionFlags, json: bool) -> Result<()> {
    info!("Starting build");
    let project = Project::open(path, flags)?;
    let out_dir = out_dir.map_or_else(|| project.root.join("build"), Utf8PathBuf::from);
    debug!(out_dir = %out_dir, "Output directory");

    let mut transpiler = Transpiler::new(project.options.clone());
    let mut reports = Vec::new();
    let mut failed = 0usize;
    for file in &project.files {
        let source = read_source(file)?;
        let result = transpiler.transpile(&source, file.as_str());
        if let Ok(output) = &result {
            let target = output_path(file, &project.search_dir, &out_dir);
            write_output(&target, output)?;
            info!(source = %file, target = %target, "Transpiled");
        }
        if json {
            reports.push(TranspileReport::from_result(&result));
        }
        if !report_outcome(result, file, &source, json) {
            failed += 1;
        }
    }

    finish(&reports, json, failed, project.files.len(), "Build")
}

/// Transpile Sona source files without writing anything.
#[instrument(skip_all, fields(path = %path))]
pub fn check(path: &str, flags: &OptionFlags, json: bool) -> Result<()> {
    info!("Starting check");
    let project = Project::open(path, flags)?;

    let mut transpiler = Transpiler::new(project.options.clone());
    let mut reports = Vec::new();
    let mut failed = 0usize;
    for file in &project.files {
        let source = read_source(file)?;
        let result = transpiler.transpile(&source, file.as_str());
        if json {
            reports.push(TranspileReport::from_result(&result));
        }
        if !report_outcome(result, file, &source, json) {
            failed += 1;
        }
    }

    finish(&reports, json, failed, project.files.len(), "Check")
}

/// The files to process and the options to process them with.
#[derive(Debug)]
struct Project {
    /// Directory holding `sona.toml` (the input itself, or its parent).
    root: Utf8PathBuf,
    /// Directory output paths are made relative to.
    search_dir: Utf8PathBuf,
    files: Vec<Utf8PathBuf>,
    options: CodegenOptions,
}

impl Project {
    fn open(path: &str, flags: &OptionFlags) -> Result<Self> {
        let source_path = Utf8PathBuf::from(path);
        let (root, search_dir) = if source_path.is_dir() {
            let src_dir = source_path.join("src");
            let search_dir = if src_dir.is_dir() {
                src_dir
            } else {
                source_path.clone()
            };
            (source_path.clone(), search_dir)
        } else {
            let parent = source_path
                .parent()
                .filter(|parent| !parent.as_str().is_empty())
                .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
            (parent.clone(), parent)
        };

        let files = find_source_files(&source_path)?;
        if files.is_empty() {
            error!("No .sona source files found in '{}'", path);
            miette::bail!("No .sona source files found in '{path}'");
        }
        info!(count = files.len(), "Found source files");

        let settings = manifest::find_manifest(&root)?;
        if let Some(ref settings) = settings {
            debug!(?settings, "Found sona.toml");
        } else {
            debug!("No sona.toml found, using defaults");
        }
        let options = codegen_options(settings.as_ref(), flags);
        debug!(?options, "Code generation options");

        Ok(Self {
            root,
            search_dir,
            files,
            options,
        })
    }
}

/// Defaults, then `sona.toml`, then command-line flags.
fn codegen_options(
    settings: Option<&manifest::TranspileSettings>,
    flags: &OptionFlags,
) -> CodegenOptions {
    let mut options = CodegenOptions::new();
    if let Some(settings) = settings {
        options = settings.apply(options);
    }
    if let Some(module) = &flags.runtime {
        options = options.with_runtime_module(manifest::runtime_module(module));
    }
    if flags.no_header {
        options = options.with_header(false);
    }
    if flags.source_map {
        options = options.with_source_maps(true);
    }
    if flags.no_source_map {
        options = options.with_source_maps(false);
    }
    if let Some(width) = flags.line_width {
        options = options.with_line_width(width);
    }
    options
}

/// Find `.sona` files at `path`, sorted for deterministic output.
fn find_source_files(path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if path.extension() == Some(SOURCE_EXTENSION) {
            files.push(path.to_path_buf());
        } else {
            miette::bail!("File '{}' is not a .sona source file", path);
        }
    } else if path.is_dir() {
        let src_dir = path.join("src");
        let search_dir = if src_dir.is_dir() {
            src_dir
        } else {
            path.to_path_buf()
        };
        collect_source_files(&search_dir, &mut files)?;
    } else {
        miette::bail!("Path '{}' does not exist", path);
    }

    files.sort();
    Ok(files)
}

/// Recursively collect `.sona` files, skipping symlinks, hidden entries and
/// `build/` output.
fn collect_source_files(dir: &Utf8Path, files: &mut Vec<Utf8PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read directory '{dir}'"))?
    {
        let entry = entry.into_diagnostic()?;
        let file_type = entry.file_type().into_diagnostic()?;
        if file_type.is_symlink() {
            continue;
        }
        let entry_path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|_| miette::miette!("Non-UTF-8 path"))?;
        let hidden = entry_path
            .file_name()
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            continue;
        }

        if file_type.is_dir() {
            if entry_path.file_name() != Some("build") {
                collect_source_files(&entry_path, files)?;
            }
        } else if file_type.is_file() && entry_path.extension() == Some(SOURCE_EXTENSION) {
            files.push(entry_path);
        }
    }
    Ok(())
}

fn read_source(file: &Utf8Path) -> Result<String> {
    fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read source file '{file}'"))
}

/// `search_dir/a/b.sona` → `out_dir/a/b.py`.
fn output_path(file: &Utf8Path, search_dir: &Utf8Path, out_dir: &Utf8Path) -> Utf8PathBuf {
    let relative = file
        .strip_prefix(search_dir)
        .ok()
        .map_or_else(
            || Utf8PathBuf::from(file.file_name().unwrap_or("main.sona")),
            Utf8Path::to_path_buf,
        );
    out_dir.join(relative).with_extension("py")
}

/// Writes the Python file and, when one was produced, its source map.
fn write_output(target: &Utf8Path, output: &TranspileOutput) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create directory '{parent}'"))?;
    }
    fs::write(target, &output.code)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write '{target}'"))?;

    if let Some(source_map) = &output.source_map {
        let map_path = Utf8PathBuf::from(format!("{target}.map"));
        let json = source_map.to_json().into_diagnostic()?;
        fs::write(&map_path, json)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write '{map_path}'"))?;
        debug!(path = %map_path, mappings = source_map.mappings.len(), "Wrote source map");
    }
    Ok(())
}

/// Prints warnings or the error for one file; returns whether it succeeded.
/// In JSON mode the report carries everything, so nothing is printed here.
fn report_outcome(
    result: std::result::Result<TranspileOutput, TranspileError>,
    file: &Utf8Path,
    source: &str,
    json: bool,
) -> bool {
    match result {
        Ok(output) => {
            if !json {
                for warning in &output.warnings {
                    let diagnostic =
                        CompileDiagnostic::from_core_diagnostic(warning, file.as_str(), source);
                    eprintln!("{:?}", miette::Report::new(diagnostic));
                }
            }
            if !output.warnings.is_empty() {
                warn!(file = %file, count = output.warnings.len(), "Warnings");
            }
            true
        }
        Err(error) => {
            error!(file = %file, kind = error.kind(), "Transpile failed");
            if !json {
                eprintln!("{:?}", error_report(error, file.as_str(), source));
            }
            false
        }
    }
}

fn finish(
    reports: &[TranspileReport],
    json: bool,
    failed: usize,
    total: usize,
    action: &str,
) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(reports).into_diagnostic()?;
        println!("{rendered}");
    }
    if failed > 0 {
        miette::bail!("{action} failed: {failed} of {total} file(s) had errors");
    }
    info!(files = total, "{action} complete");
    Ok(())
}
