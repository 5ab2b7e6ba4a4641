//! Project configuration for `gluer check` and `gluer cycles`.
//!
//! # Example
//!
//! ```toml
//! [project]
//! universe = "universe.json"
//! specs = ["glue/main.gluer", "glue/precedence.gluer"]
//! ```
//!
//! Relative paths resolve against the directory holding the config file.
//! Anything given on the command line replaces the configured value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG: &str = "gluer.toml";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSection,
}

/// `[project]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProjectSection {
    /// Type universe JSON document.
    pub universe: Option<PathBuf>,
    /// Specification files, checked in order.
    #[serde(default)]
    pub specs: Vec<PathBuf>,
}

/// What a command runs on, after merging the config with the arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Inputs {
    pub universe: Option<PathBuf>,
    pub specs: Vec<PathBuf>,
}

pub(crate) fn read_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: ProjectConfig = toml::from_str(&src).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.project.universe = config.project.universe.map(|p| base.join(p));
    config.project.specs = config.project.specs.into_iter().map(|p| base.join(p)).collect();
    Ok(config)
}

/// Read `explicit`, or `gluer.toml` in the working directory if present.
pub(crate) fn find_config(explicit: Option<&Path>) -> Result<Option<ProjectConfig>, ConfigError> {
    match explicit {
        Some(path) => read_config(path).map(Some),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.is_file() {
                read_config(default).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

/// Command-line values win; the config fills in what they leave out.
pub(crate) fn merge(
    config: Option<ProjectConfig>,
    universe: Option<PathBuf>,
    specs: Vec<PathBuf>,
) -> Inputs {
    let project = config.map(|c| c.project).unwrap_or_default();
    Inputs {
        universe: universe.or(project.universe),
        specs: if specs.is_empty() { project.specs } else { specs },
    }
}
