//! Queries against the `go` command.
//!
//! Three questions are asked of the toolchain:
//!
//! - where is the main module (`go env GOMOD`)
//! - which packages live under a directory and what do they import
//!   (`go list -e -json=... ./...`)
//! - is an import path part of the standard library
//!   (`go list -f={{.Standard}} <path>`)
//!
//! GOOS and GOARCH are passed as environment overrides on the package
//! queries so build constraints are evaluated for the requested platform.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::Platform;
use crate::errors::{CaplockError, Result};
use crate::io::{CommandOutput, CommandRunner, Invocation};

/// Fields requested from `go list`. Only import edges and module metadata;
/// no type checking, no dependency closure, no test packages.
const LIST_FIELDS: &str = "-json=ImportPath,Imports,Module,Error,DepsErrors";

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// A package from the loaded graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GoPackage {
    pub import_path: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub module: Option<GoModule>,
    #[serde(default)]
    pub error: Option<PackageError>,
    #[serde(default)]
    pub deps_errors: Vec<PackageError>,
}

impl GoPackage {
    /// Path of the module this package belongs to, if any.
    pub fn module_path(&self) -> Option<&str> {
        self.module.as_ref().map(|m| m.path.as_str())
    }

    /// Package and dependency errors, formatted `pos: err`.
    pub fn errors(&self) -> impl Iterator<Item = String> + '_ {
        self.error
            .iter()
            .chain(self.deps_errors.iter())
            .map(PackageError::describe)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GoModule {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageError {
    #[serde(default)]
    pub pos: String,
    pub err: String,
}

impl PackageError {
    fn describe(&self) -> String {
        if self.pos.is_empty() {
            self.err.clone()
        } else {
            format!("{}: {}", self.pos, self.err)
        }
    }
}

/// Thin wrapper issuing `go` invocations through a [`CommandRunner`].
pub struct GoTool<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    program: &'a str,
    platform: &'a Platform,
}

impl<'a, R: CommandRunner + ?Sized> GoTool<'a, R> {
    pub fn new(runner: &'a R, program: &'a str, platform: &'a Platform) -> Self {
        Self {
            runner,
            program,
            platform,
        }
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(self.program)
    }

    fn with_platform(&self, invocation: Invocation) -> Invocation {
        self.platform
            .env()
            .into_iter()
            .fold(invocation, |inv, (key, value)| inv.env(key, value))
    }

    /// Directory of the main module's `go.mod`, as seen from `cwd`.
    pub fn module_root(&self, cwd: &Path) -> Result<PathBuf> {
        let out = self.runner.run(
            &self
                .invocation()
                .args(["env", "GOMOD"])
                .current_dir(cwd),
        )?;
        if !out.is_success() {
            return Err(CaplockError::environment(format!(
                "go env {}: {}",
                out.status_text(),
                out.stderr_lossy().trim()
            )));
        }

        let gomod = out.stdout_lossy().trim().to_string();
        if gomod.is_empty() {
            return Err(CaplockError::environment(
                "go tool not running in module mode",
            ));
        }
        if gomod == NULL_DEVICE {
            return Err(CaplockError::config("no go.mod"));
        }

        let gomod = PathBuf::from(gomod);
        gomod
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CaplockError::config(format!("unexpected GOMOD {}", gomod.display())))
    }

    /// Load every package under `root` with its direct imports.
    pub fn list_packages(&self, root: &Path) -> Result<Vec<GoPackage>> {
        let invocation = self.with_platform(
            self.invocation()
                .args(["list", "-e", LIST_FIELDS, "./..."])
                .current_dir(root),
        );
        let out = self.runner.run(&invocation)?;
        if !out.is_success() {
            return Err(CaplockError::load(format!(
                "go list {}: {}",
                out.status_text(),
                out.stderr_lossy().trim()
            )));
        }
        parse_package_stream(&out.stdout)
    }

    /// Whether `import_path` is a standard-library package for the platform.
    ///
    /// The error message is the `go list` failure only; callers add the
    /// importers.
    pub fn is_standard(&self, root: &Path, import_path: &str) -> Result<bool> {
        let invocation = self.with_platform(
            self.invocation()
                .args(["list", "-f={{.Standard}}", import_path])
                .current_dir(root),
        );
        let out = self.runner.run(&invocation)?;
        if !out.is_success() {
            return Err(CaplockError::environment(format!(
                "go list {}: {}",
                out.status_text(),
                first_note(&out)
            )));
        }
        Ok(out.stdout_lossy().trim() == "true")
    }
}

/// `go list` errors often end in a long `; to add it: go get ...` hint. Keep
/// only the part before the first `;`.
fn first_note(out: &CommandOutput) -> String {
    let stderr = out.stderr_lossy();
    match stderr.split_once(';') {
        Some((note, _)) => note.trim().to_string(),
        None => stderr.trim().to_string(),
    }
}

/// Decode the concatenated JSON objects printed by `go list -json`.
pub fn parse_package_stream(bytes: &[u8]) -> Result<Vec<GoPackage>> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<GoPackage>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CaplockError::load(format!("decoding go list output: {e}")))
}
