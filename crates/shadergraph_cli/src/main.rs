// SPDX-License-Identifier: MIT OR Apache-2.0
//! `shadergraph` - compile one component of a shader graph project.
//!
//! Loads a project saved as RON, compiles the requested component (its
//! function libraries and patterns included) and prints the emitted source.
//! With `--bindings` the bound data buffer inputs are printed as JSON, in
//! the order the buffer must be filled.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use shadergraph_compiler::{input_values, CompileOutput, Compiler, CompilerConfig, TranslationUnit};
use shadergraph_model::{ComponentId, ComponentKind, InputRef, Project};

/// Shader graph compiler
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Project file (RON)
    project: PathBuf,

    /// Compiler configuration (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Component to compile, by name or id (default: the last one)
    #[arg(long)]
    component: Option<String>,

    /// Index of the first data buffer slot, overrides the configuration
    #[arg(long)]
    base_offset: Option<usize>,

    /// Print a complete translation unit instead of the raw code
    #[arg(long)]
    assemble: bool,

    /// Print the bound inputs as JSON
    #[arg(long)]
    bindings: bool,
}

/// One data buffer slot
#[derive(Serialize)]
struct Binding {
    index: usize,
    input: InputRef,
    component: ComponentId,
    value: [f32; 4],
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("shadergraph=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            CompilerConfig::from_ron(&text)
                .into_diagnostic()
                .wrap_err("invalid compiler configuration")?
        }
        None => CompilerConfig::default(),
    };
    if let Some(offset) = cli.base_offset {
        config.base_offset = offset;
    }

    let text = std::fs::read_to_string(&cli.project)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", cli.project.display()))?;
    let mut project = Project::from_ron(&text)
        .into_diagnostic()
        .wrap_err("failed to decode project")?;
    let pruned = project.prune_connections();
    if pruned > 0 {
        tracing::warn!(pruned, "Dropped dangling connections");
    }

    let target = select_component(&project, cli.component.as_deref())?;
    tracing::info!(project = %project.name, component = %target, "Compiling");

    let mut compiler = Compiler::new(config);
    let output = compiler
        .compile_in_project(&mut project, target)
        .into_diagnostic()
        .wrap_err("compilation failed")?;

    for diagnostic in &output.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    if cli.bindings {
        let bindings = bindings(&project, &output, compiler.config().base_offset)?;
        let json = serde_json::to_string_pretty(&bindings).into_diagnostic()?;
        println!("{json}");
    } else if cli.assemble {
        print!("{}", TranslationUnit::assemble(&output, compiler.config()));
    } else {
        print!("{}{}", output.global_code(), output.local_code());
    }
    Ok(())
}

/// Resolve the requested component, or pick the last compilable one
fn select_component(project: &Project, key: Option<&str>) -> miette::Result<ComponentId> {
    match key {
        Some(key) => project
            .find(key)
            .map(|c| c.id)
            .ok_or_else(|| miette::miette!("no component named '{key}'")),
        None => project
            .components()
            .filter(|c| !matches!(c.kind, ComponentKind::Variable | ComponentKind::FunctionContainer))
            .last()
            .map(|c| c.id)
            .ok_or_else(|| miette::miette!("project '{}' has no compilable component", project.name)),
    }
}

fn bindings(project: &Project, output: &CompileOutput, base_offset: usize) -> miette::Result<Vec<Binding>> {
    let values = input_values(&output.code, project.components(), &project.global_scope())
        .into_diagnostic()
        .wrap_err("failed to read bound values")?;
    Ok(output
        .code
        .inputs
        .iter()
        .zip(&output.code.input_components)
        .zip(values)
        .enumerate()
        .map(|(slot, ((input, component), value))| Binding {
            index: base_offset + slot,
            input: *input,
            component: *component,
            value,
        })
        .collect())
}
