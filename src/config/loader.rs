use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{CaplockError, Result};

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".caplock.toml";

const MAX_TRAVERSAL_DEPTH: usize = 9;

/// Settings read from `.caplock.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Ignore patterns merged with `-i`.
    pub ignore: Vec<String>,
    /// Custom capability map, relative to the config file's directory.
    pub capability_map: Option<PathBuf>,
    pub disable_builtin: Option<bool>,
}

/// Pure function to parse config from TOML string
pub fn parse_config(contents: &str) -> std::result::Result<FileConfig, String> {
    toml::from_str::<FileConfig>(contents).map_err(|e| e.to_string())
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Read and parse one config file. `Ok(None)` when the file does not exist.
pub(crate) fn load_config_from_path(config_path: &Path) -> Result<Option<FileConfig>> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CaplockError::config(format!(
                "failed to read {}: {}",
                config_path.display(),
                e
            )))
        }
    };

    let mut config = parse_config(&contents).map_err(|e| {
        CaplockError::config(format!("failed to parse {}: {}", config_path.display(), e))
    })?;

    if let Some(dir) = config_path.parent() {
        config.capability_map = config.capability_map.map(|map| dir.join(map));
    }

    log::debug!("Loaded config from {}", config_path.display());
    Ok(Some(config))
}

/// Find `.caplock.toml` in `start` or its ancestors; the nearest one wins.
pub fn load_config(start: &Path) -> Result<Option<(PathBuf, FileConfig)>> {
    for dir in directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH) {
        let path = dir.join(CONFIG_FILE_NAME);
        if let Some(config) = load_config_from_path(&path)? {
            return Ok(Some((path, config)));
        }
    }
    log::debug!(
        "No {} found after checking {} directories",
        CONFIG_FILE_NAME,
        MAX_TRAVERSAL_DEPTH
    );
    Ok(None)
}
