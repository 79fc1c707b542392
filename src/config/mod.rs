//! Run configuration.
//!
//! A [`LockConfig`] is assembled once at startup from three layers, later
//! layers winning:
//!
//! 1. built-in defaults (host GOOS/GOARCH, whole module, stdlib excluded)
//! 2. the nearest `.caplock.toml` in the working directory or its ancestors
//! 3. command-line flags
//!
//! Ignore patterns are the union of the file's and the flags'. The result is
//! validated before anything is executed: `disable_builtin` needs a
//! capability map and every ignore pattern must compile.

mod core;
mod loader;

pub use self::core::{AnalyzerOptions, LockConfig, Mode, Platform, Programs, ResolveScope};
pub use loader::{
    directory_ancestors, load_config, parse_config, FileConfig, CONFIG_FILE_NAME,
};

use std::collections::BTreeSet;
use std::path::Path;

use crate::cli::Cli;
use crate::errors::{CaplockError, Result};
use crate::filter::PatternSet;

/// Merge parsed flags with an optional config file into a validated config.
///
/// Relative capability map paths from the command line are resolved against
/// `cwd` so the analyzer can run from the module root.
pub fn build_config(cli: &Cli, file: Option<FileConfig>, cwd: &Path) -> Result<LockConfig> {
    let file = file.unwrap_or_default();

    let capability_map = cli
        .capability_map
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| cwd.join(p))
        .or(file.capability_map);
    let disable_builtin = cli
        .disable_builtin
        .or(file.disable_builtin)
        .unwrap_or(false);

    if disable_builtin && capability_map.is_none() {
        return Err(CaplockError::config(
            "disable_builtin requires capability_map",
        ));
    }

    let patterns: BTreeSet<&str> = file
        .ignore
        .iter()
        .chain(cli.ignore.iter())
        .map(String::as_str)
        .collect();
    let ignore = PatternSet::compile(patterns)?;

    let host = Platform::host();
    let platform = Platform::new(
        non_empty(cli.goos.as_deref()).unwrap_or(host.goos.as_str()),
        non_empty(cli.goarch.as_deref()).unwrap_or(host.goarch.as_str()),
    );

    Ok(LockConfig {
        mode: Mode::from_flags(cli.imports, cli.lock),
        platform,
        scope: ResolveScope {
            whole_module: cli.module,
            include_stdlib: cli.stdlib,
        },
        ignore,
        analyzer: AnalyzerOptions {
            capability_map,
            disable_builtin,
        },
        verbose: cli.verbose,
        programs: Programs {
            go: cli.go_program.clone(),
            capslock: cli.capslock_program.clone(),
        },
    })
}

/// Load `.caplock.toml` starting at `cwd` and merge it with the flags.
pub fn resolve_config(cli: &Cli, cwd: &Path) -> Result<LockConfig> {
    let file = match load_config(cwd)? {
        Some((path, file)) => {
            log::info!("using {}", path.display());
            Some(file)
        }
        None => None,
    };
    build_config(cli, file, cwd)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
