//! Subcommand implementations. Each `cmd_*` prints its result and exits
//! with status 1 on failure.

pub(crate) mod check;
pub(crate) mod cycles;
pub(crate) mod parse;
pub(crate) mod resolve;

use std::path::{Path, PathBuf};
use std::process;

use gluer_core::{AdapterLibrary, Diagnostic, Hierarchy, LoadedSpecs};
use gluer_universe::Universe;
use serde::Serialize;
use tracing::debug;

use crate::config::{self, Inputs};
use crate::{report_error, OutputFormat};

/// Merge `--config` (or ./gluer.toml) with the arguments.
pub(crate) fn project_inputs(
    specs: Vec<PathBuf>,
    universe: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output: OutputFormat,
    quiet: bool,
) -> Inputs {
    match config::find_config(config_path.as_deref()) {
        Ok(config) => {
            let inputs = config::merge(config, universe, specs);
            debug!(universe = ?inputs.universe, specs = inputs.specs.len(), "inputs resolved");
            inputs
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn require_specs(inputs: &Inputs, output: OutputFormat, quiet: bool) {
    if inputs.specs.is_empty() {
        report_error(
            "no specification files given (pass them as arguments or set project.specs in gluer.toml)",
            output,
            quiet,
        );
        process::exit(1);
    }
}

pub(crate) fn load_universe(path: &Path, output: OutputFormat, quiet: bool) -> Universe {
    match Universe::from_path(path) {
        Ok(u) => u,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn adapter_library(
    universe: &Universe,
    hierarchy: &Hierarchy<'_>,
    output: OutputFormat,
    quiet: bool,
) -> AdapterLibrary {
    match universe.adapter_library(hierarchy) {
        Ok(library) => library,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}

/// Print the loader's diagnostics and exit if any file failed to load.
pub(crate) fn exit_on_load_errors(loaded: &LoadedSpecs, output: OutputFormat, quiet: bool) {
    if !loaded.has_errors() {
        return;
    }
    print_diagnostics(&loaded.diagnostics, output, quiet);
    process::exit(1);
}

fn print_diagnostics(diagnostics: &[Diagnostic], output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let values: Vec<_> = diagnostics.iter().map(Diagnostic::to_json_value).collect();
            print_json(&serde_json::json!({ "diagnostics": values }));
        }
        OutputFormat::Text => {
            if !quiet {
                for d in diagnostics {
                    eprintln!("{}", d);
                }
            }
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
    println!("{}", json);
}
