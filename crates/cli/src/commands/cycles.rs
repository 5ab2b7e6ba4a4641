use std::path::PathBuf;

use gluer_core::{detect_cycles, load_spec_files, Declaration, Hierarchy, PrecedenceMap};

use super::{
    adapter_library, exit_on_load_errors, load_universe, print_json, project_inputs,
    require_specs,
};
use crate::OutputFormat;

pub(crate) fn cmd_cycles(
    specs: Vec<PathBuf>,
    universe: Option<PathBuf>,
    config: Option<PathBuf>,
    output: OutputFormat,
    quiet: bool,
) {
    let inputs = project_inputs(specs, universe, config, output, quiet);
    require_specs(&inputs, output, quiet);

    let loaded = load_spec_files(&inputs.specs);
    exit_on_load_errors(&loaded, output, quiet);

    let mut map = PrecedenceMap::new();
    let adapters = inputs.universe.as_deref().map(|path| {
        let universe = load_universe(path, output, quiet);
        let hierarchy = Hierarchy::new(&universe);
        adapter_library(&universe, &hierarchy, output, quiet)
    });
    for d in &loaded.declarations {
        let Declaration::Precedence(p) = d else {
            continue;
        };
        let known = adapters
            .as_ref()
            .map_or(true, |lib| lib.contains(&p.higher.name) && lib.contains(&p.lower.name));
        if known {
            map.declare(&p.higher.name, &p.lower.name);
        }
    }

    let cycles = detect_cycles(&map);
    match output {
        OutputFormat::Json => print_json(&serde_json::json!({ "cycles": cycles })),
        OutputFormat::Text => {
            for cycle in &cycles {
                println!("warning: cyclic precedence: {}", cycle);
            }
            if cycles.is_empty() && !quiet {
                println!("no precedence cycles");
            }
        }
    }
}
