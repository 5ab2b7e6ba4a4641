use std::path::Path;

use gluer_core::load_spec_files;

use super::{exit_on_load_errors, print_json};
use crate::OutputFormat;

pub(crate) fn cmd_parse(file: &Path, output: OutputFormat, quiet: bool) {
    let loaded = load_spec_files(&[file.to_path_buf()]);
    exit_on_load_errors(&loaded, output, quiet);

    match output {
        OutputFormat::Json => print_json(&loaded.declarations),
        OutputFormat::Text => {
            for d in &loaded.declarations {
                let prov = d.prov();
                println!("{}:{} {}", prov.file, prov.line, d);
            }
        }
    }
}
