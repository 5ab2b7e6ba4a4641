use std::path::{Path, PathBuf};
use std::process;

use gluer_core::{load_spec_files, resolve, Hierarchy, PrecedenceMap};

use super::{adapter_library, exit_on_load_errors, load_universe, print_json};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_resolve(
    universe_path: &Path,
    from: &str,
    to: &str,
    specs: &[PathBuf],
    output: OutputFormat,
    quiet: bool,
) {
    let universe = load_universe(universe_path, output, quiet);
    let hierarchy = Hierarchy::new(&universe);
    let mut library = adapter_library(&universe, &hierarchy, output, quiet);

    if !specs.is_empty() {
        let loaded = load_spec_files(specs);
        exit_on_load_errors(&loaded, output, quiet);
        library.set_precedence(PrecedenceMap::from_declarations(&loaded.declarations));
    }

    let verdict = match resolve(from, to, &library, &hierarchy) {
        Ok(v) => v,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&verdict),
        OutputFormat::Text => match verdict.adapter() {
            Some(adapter) => println!("{}", adapter),
            None => {
                if !quiet {
                    println!("{}", verdict);
                }
            }
        },
    }

    if verdict.adapter().is_none() {
        process::exit(1);
    }
}
