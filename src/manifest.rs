//! Build manifest: which validator files to generate from which graphs.
//!
//! ```json
//! {
//!   "dialect": "zod",
//!   "targets": [
//!     { "targetFile": "out/user.ts", "graph": "user.graph.json",
//!       "sourceModule": "./user", "types": ["User"], "lazy": ["Tree"] }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the manifest's directory.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dialect::DialectKind;
use crate::error::Error;
use crate::model::TypeGraph;
use crate::render::{RenderOptions, render};
use crate::session::{Generated, Root, generate};
use crate::tracker::Diagnostic;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    /// Default dialect for targets that do not name one.
    #[serde(default = "default_dialect")]
    pub dialect: DialectKind,
    #[serde(default)]
    pub header: Option<String>,
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Target {
    pub target_file: PathBuf,
    pub graph: PathBuf,
    pub source_module: String,
    pub types: Vec<String>,
    /// Exports to emit lazily whether or not they recurse.
    #[serde(default)]
    pub lazy: Vec<String>,
    #[serde(default)]
    pub dialect: Option<DialectKind>,
}

/// Rendered output of one target.
#[derive(Debug, Clone)]
pub struct Built {
    pub target_file: PathBuf,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

fn default_dialect() -> DialectKind {
    DialectKind::Runtypes
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Manifest {
    pub fn from_json_str(src: &str) -> Result<Self, Error> {
        crate::path_de::from_str_with_path(src)
    }

    /// Load from disk and anchor every relative path at the manifest's directory.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_json_str(&src)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for target in &mut manifest.targets {
            target.target_file = base.join(&target.target_file);
            target.graph = base.join(&target.graph);
        }
        Ok(manifest)
    }

    pub fn dialect_of(&self, target: &Target) -> DialectKind {
        target.dialect.unwrap_or(self.dialect)
    }

    pub fn render_options(&self, target: &Target) -> RenderOptions {
        RenderOptions { source_module: target.source_module.clone(), header: self.header.clone() }
    }
}

impl Target {
    /// Requested types as session roots, with the forced-lazy ones marked.
    pub fn roots(&self) -> Vec<Root> {
        self.types
            .iter()
            .map(|name| Root { name: name.clone(), force_lazy: self.lazy.contains(name) })
            .collect()
    }

    /// Generate and render this target against an already loaded graph.
    pub fn build_with(&self, graph: &TypeGraph, dialect: DialectKind, options: &RenderOptions) -> Result<Built, Error> {
        let Generated { instructions, diagnostics } = generate(graph, dialect.writer(), &self.roots())?;
        let source = render(&instructions, options)?;
        Ok(Built { target_file: self.target_file.clone(), source, diagnostics })
    }
}

// ------------------------------- Tests ------------------------------------ //
