//! Minimal CLI: type graph → validators (emit | build)
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use guardgen::manifest::{Built, Manifest, Target};
use guardgen::{DialectKind, RenderOptions, TypeGraph};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate runtypes / zod / io-ts validators from a serialized type graph
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate validators for some exports of one graph
    Emit(EmitOut),
    /// generate every target listed in a JSON manifest
    Build(BuildOut),
}

#[derive(Args, Debug, Clone)]
struct GraphSettings {
    /// type graph JSON produced by the type-information provider
    #[arg(long, short)]
    graph: PathBuf,

    /// module the generated file imports the original types from (e.g. ./types)
    #[arg(long)]
    source_module: String,

    /// comment placed at the top of the generated file
    #[arg(long)]
    header: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct EmitOut {
    #[command(flatten)]
    graph_settings: GraphSettings,

    /// target validation library
    #[arg(long, short, value_enum, default_value_t = DialectKind::Runtypes)]
    dialect: DialectKind,

    /// exported type names to generate
    #[arg(long, short, num_args = 1.., required = true)]
    types: Vec<String>,

    /// exported type names to always emit lazily
    #[arg(long, num_args = 1..)]
    lazy: Vec<String>,

    /// output .ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct BuildOut {
    /// manifest JSON listing the targets
    #[arg(long, short)]
    manifest: PathBuf,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl GraphSettings {
    fn render_options(&self) -> RenderOptions {
        RenderOptions { source_module: self.source_module.clone(), header: self.header.clone() }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Emit(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let graph = load_graph(&target.graph_settings.graph)?;
                let request = Target {
                    target_file: target.out.clone().unwrap_or_default(),
                    graph: target.graph_settings.graph.clone(),
                    source_module: target.graph_settings.source_module.clone(),
                    types: target.types.clone(),
                    lazy: target.lazy.clone(),
                    dialect: Some(target.dialect),
                };
                let built = request
                    .build_with(&graph, target.dialect, &target.graph_settings.render_options())
                    .context("generation failed")?;

                match target.out.as_ref() {
                    Some(_) => write_built(&built)?,
                    None => print!("{}", built.source),
                }
                // stdout output has no file to name, so warnings point at the graph
                let origin = target.out.as_deref().unwrap_or(&target.graph_settings.graph);
                report_diagnostics(&built, origin);
            }
            Command::Build(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let manifest = Manifest::load(&target.manifest)
                    .with_context(|| format!("failed to load manifest {}", target.manifest.display()))?;
                eprintln!("{}", format!("Found {} target(s)", manifest.targets.len()).green());

                // targets are independent; each gets its own session
                let built = manifest
                    .targets
                    .par_iter()
                    .map(|t| build_target(&manifest, t))
                    .collect::<anyhow::Result<Vec<_>>>()?;

                for built in &built {
                    write_built(built)?;
                    report_diagnostics(built, &built.target_file);
                }
                eprintln!("{}", "Build finished.".green());
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_graph(path: &Path) -> anyhow::Result<TypeGraph> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read graph {}", path.display()))?;
    TypeGraph::from_json_str(&source).with_context(|| format!("failed to parse graph {}", path.display()))
}

fn build_target(manifest: &Manifest, target: &Target) -> anyhow::Result<Built> {
    let graph = load_graph(&target.graph)?;
    let dialect = manifest.dialect_of(target);
    tracing::debug!(target_file = %target.target_file.display(), %dialect, "building target");
    target
        .build_with(&graph, dialect, &manifest.render_options(target))
        .with_context(|| format!("failed to generate {}", target.target_file.display()))
}

fn write_built(built: &Built) -> anyhow::Result<()> {
    let out = &built.target_file;
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, &built.source).with_context(|| format!("failed to write {}", out.display()))?;
    eprintln!("{}", format!("Wrote {}", out.display()).green());
    Ok(())
}

fn report_diagnostics(built: &Built, origin: &Path) {
    if !built.diagnostics.is_empty() {
        eprintln!(
            "{}",
            format!("{} circular reference warning(s) in {}", built.diagnostics.len(), origin.display()).yellow()
        );
    }
}
