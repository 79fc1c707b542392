//! The single caplock command: list, write or compare.
//!
//! ```text
//! Idle ─┬─ -imports ─▶ Listing ─────────▶ Done (0)
//!       ├─ -lock ────▶ WritingBaseline ─▶ Done (0)
//!       └─ default ──▶ Comparing ───────▶ Done (0 or 4)
//! ```
//!
//! Any error on the way aborts the run; the caller maps it to an exit status.

use std::io::Write;
use std::path::Path;

use crate::baseline::BaselineStore;
use crate::config::{LockConfig, Mode};
use crate::errors::{CaplockError, ExitStatus, Result};
use crate::io::CommandRunner;
use crate::resolver::{ImportResolver, Resolution};

/// Run one invocation of caplock from `cwd`, writing results to `out`.
pub fn run<R: CommandRunner + ?Sized>(
    config: &LockConfig,
    runner: &R,
    cwd: &Path,
    out: &mut dyn Write,
) -> Result<ExitStatus> {
    let resolver = ImportResolver::new(runner, &config.programs.go, &config.platform);
    let resolution = resolver.resolve(cwd, &config.ignore, config.scope)?;
    log::debug!(
        "analysis target has {} packages (root {})",
        resolution.imports.len(),
        resolution.root.display()
    );

    match config.mode {
        Mode::ListImports => list_imports(&resolution, out),
        Mode::WriteBaseline => write_baseline(config, runner, &resolution, out),
        Mode::Compare => compare_baseline(config, runner, &resolution, out),
    }
}

fn list_imports(resolution: &Resolution, out: &mut dyn Write) -> Result<ExitStatus> {
    for import in &resolution.imports {
        writeln!(out, "{import}").map_err(stdout_error)?;
    }
    Ok(ExitStatus::SUCCESS)
}

fn baseline_store<'a, R: CommandRunner + ?Sized>(
    config: &'a LockConfig,
    runner: &'a R,
    resolution: &Resolution,
) -> BaselineStore<'a, R> {
    BaselineStore::new(
        runner,
        &config.programs.capslock,
        &config.platform,
        &config.analyzer,
        &resolution.root,
    )
}

fn write_baseline<R: CommandRunner + ?Sized>(
    config: &LockConfig,
    runner: &R,
    resolution: &Resolution,
    out: &mut dyn Write,
) -> Result<ExitStatus> {
    let store = baseline_store(config, runner, resolution);

    let summary = store.write_summary(&resolution.imports)?;
    if config.verbose {
        out.write_all(&summary).map_err(stdout_error)?;
        writeln!(out).map_err(stdout_error)?;
    }
    store.write_lock(&resolution.imports)?;
    Ok(ExitStatus::SUCCESS)
}

fn compare_baseline<R: CommandRunner + ?Sized>(
    config: &LockConfig,
    runner: &R,
    resolution: &Resolution,
    out: &mut dyn Write,
) -> Result<ExitStatus> {
    let store = baseline_store(config, runner, resolution);

    let diff = store.compare(&resolution.imports, &store.lock_path())?;
    out.write_all(&diff).map_err(stdout_error)?;
    if diff.is_empty() {
        Ok(ExitStatus::SUCCESS)
    } else {
        Ok(ExitStatus::CAPABILITY_CHANGE)
    }
}

fn stdout_error(e: std::io::Error) -> CaplockError {
    CaplockError::io("<stdout>", e)
}
