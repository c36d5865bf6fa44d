//! Front end: source text to packed binary module.
//!
//! [`Compiler`] drives the whole packing pipeline (line walk through
//! [`ModuleBuilder`], post-pass, module encoding) and owns the
//! compiled-modules cache that deduplicates includes within one run.

mod builder;
mod error;
mod postpass;

pub use builder::{parse_literal, BuilderOutput, IncludeLoader, ModuleBuilder};
pub use error::{BuildError, BuildErrorKind, Diagnostic, DiagnosticKind};
pub use postpass::{run as run_postpass, PostPassResult};

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::module::{DataSegment, ModuleImage, encode_module};

/// Outcome of one `pack` call.
#[derive(Debug, Clone)]
pub struct PackReport {
    /// Base name of the packed module.
    pub module: String,
    /// Recoverable diagnostics from this module and its includes.
    pub diagnostics: Vec<Diagnostic>,
}

impl PackReport {
    /// Returns `true` when any diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Source-to-binary compiler with an include cache.
#[derive(Debug, Default)]
pub struct Compiler {
    search_root: PathBuf,
    cache: BTreeMap<String, DataSegment>,
    active: BTreeSet<String>,
    nested_diagnostics: Vec<Diagnostic>,
}

/// Returns a path's base name, the module cache key.
pub fn module_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Compiler {
    /// Creates a compiler resolving relative include paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            search_root: root.into(),
            ..Self::default()
        }
    }

    /// Resolves a source-text include path against the search root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.search_root.join(candidate)
        }
    }

    /// Returns the cached data segment for a module base name, if loaded.
    pub fn cached(&self, module: &str) -> Option<&DataSegment> {
        self.cache.get(module)
    }

    /// Compiles one source file into a binary module.
    ///
    /// Include diagnostics bubble into the returned report; recoverable
    /// line diagnostics never abort the pack.
    pub fn pack(&mut self, source: &Path, output: &Path) -> Result<PackReport, BuildError> {
        let module = module_base_name(source);
        if !self.active.insert(module.clone()) {
            return Err(BuildError::include(format!(
                "include cycle through {module}"
            )));
        }
        let result = self.pack_guarded(&module, source, output);
        self.active.remove(&module);
        result
    }

    fn pack_guarded(
        &mut self,
        module: &str,
        source: &Path,
        output: &Path,
    ) -> Result<PackReport, BuildError> {
        let text = fs::read_to_string(source)
            .map_err(|err| BuildError::io(format!("cannot read {}: {err}", source.display())))?;

        let nested_start = self.nested_diagnostics.len();
        let mut builder = ModuleBuilder::new(module);
        for line in text.lines() {
            builder.add_line(line, self)?;
        }

        let result = run_postpass(builder.finish())?;
        let bytes = encode_module(&result.include_blobs, &result.code, &result.data)?;
        fs::write(output, &bytes)
            .map_err(|err| BuildError::io(format!("cannot write {}: {err}", output.display())))?;

        log::info!(
            "packed {} -> {} ({} bytes, {} instruction(s))",
            source.display(),
            output.display(),
            bytes.len(),
            result.code.len()
        );

        self.cache.insert(module.to_string(), result.data);

        let mut diagnostics: Vec<Diagnostic> =
            self.nested_diagnostics.drain(nested_start..).collect();
        diagnostics.extend(result.diagnostics);
        Ok(PackReport {
            module: module.to_string(),
            diagnostics,
        })
    }
}

impl IncludeLoader for Compiler {
    fn load(&mut self, path: &str) -> Result<DataSegment, BuildError> {
        let resolved = self.resolve(path);
        let module = module_base_name(&resolved);

        if let Some(segment) = self.cache.get(&module) {
            return Ok(segment.clone());
        }
        if self.active.contains(&module) {
            return Err(BuildError::include(format!(
                "include cycle through {module}"
            )));
        }

        let is_binary = resolved
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"));

        let segment = if is_binary {
            let bytes = fs::read(&resolved).map_err(|err| {
                BuildError::io(format!("cannot read {}: {err}", resolved.display()))
            })?;
            let image = ModuleImage::decode(&bytes)?;
            self.cache.insert(module, image.data.clone());
            image.data
        } else {
            let output = resolved.with_extension("bin");
            let report = self.pack(&resolved, &output)?;
            self.nested_diagnostics.extend(report.diagnostics);
            self.cache
                .get(&report.module)
                .cloned()
                .ok_or_else(|| BuildError::include(format!("include {path} produced no module")))?
        };

        Ok(segment)
    }
}
