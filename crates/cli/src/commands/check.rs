use std::path::PathBuf;
use std::process;

use gluer_core::{load_spec_files, CheckReport, Checker, Diagnostic, Hierarchy, Severity, Wiring};

use super::{adapter_library, load_universe, print_json, project_inputs, require_specs};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_check(
    specs: Vec<PathBuf>,
    universe: Option<PathBuf>,
    config: Option<PathBuf>,
    output: OutputFormat,
    quiet: bool,
) {
    // Step 1: Work out what to check
    let inputs = project_inputs(specs, universe, config, output, quiet);
    let Some(universe_path) = inputs.universe.clone() else {
        report_error(
            "no type universe given (use --universe or set project.universe in gluer.toml)",
            output,
            quiet,
        );
        process::exit(1);
    };
    require_specs(&inputs, output, quiet);

    // Step 2: Classes and adapters
    let universe = load_universe(&universe_path, output, quiet);
    let hierarchy = Hierarchy::new(&universe);
    let library = adapter_library(&universe, &hierarchy, output, quiet);

    // Step 3: Load and check every file
    let loaded = load_spec_files(&inputs.specs);
    let mut report = Checker::new(&universe, &hierarchy, library).check(&loaded);
    let universe_file = universe_path.to_string_lossy();
    for problem in universe.adapter_shape_problems() {
        report
            .diagnostics
            .push(Diagnostic::error(&universe_file, 0, problem));
    }

    // Step 4: Format output
    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => print_text(&report, quiet),
    }

    if report.has_errors() {
        process::exit(1);
    }
}

fn print_text(report: &CheckReport, quiet: bool) {
    if !quiet {
        for outcome in &report.associations {
            let a = &outcome.association;
            let how = match &outcome.wiring {
                Wiring::Direct => "direct".to_string(),
                Wiring::Explicit { adapter } => format!("using {}", adapter),
                Wiring::Resolved { adapter } => format!("adapter {}", adapter),
            };
            println!("{}:{} {}: {}", a.prov.file, a.prov.line, a.where_clause, how);
        }
    }

    for d in &report.diagnostics {
        let severity = match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("{}: {}", severity, d);
    }

    if !quiet {
        println!(
            "{} association(s) wired, {} error(s), {} warning(s)",
            report.associations.len(),
            report.errors().count(),
            report.warnings().count()
        );
    }
}
