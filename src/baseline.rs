//! Baseline files and the capslock invocations that produce them.
//!
//! Two files live in the root directory:
//!
//! - `caps.lock`: `capslock -output json`, the machine-readable baseline
//! - `caps.summary`: `capslock -output verbose`, for humans reviewing diffs
//!
//! Their content is whatever capslock prints; it is written and compared
//! byte for byte without interpretation.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{AnalyzerOptions, Platform};
use crate::errors::{CaplockError, Result};
use crate::io::{self, CommandRunner, Invocation};

pub const LOCK_FILE: &str = "caps.lock";
pub const SUMMARY_FILE: &str = "caps.summary";

/// Output selector passed to `capslock -output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Verbose,
    Compare,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Verbose => "verbose",
            OutputFormat::Compare => "compare",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads and writes the baseline in one root directory.
pub struct BaselineStore<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    program: &'a str,
    platform: &'a Platform,
    options: &'a AnalyzerOptions,
    root: PathBuf,
}

impl<'a, R: CommandRunner + ?Sized> BaselineStore<'a, R> {
    pub fn new(
        runner: &'a R,
        program: &'a str,
        platform: &'a Platform,
        options: &'a AnalyzerOptions,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            program,
            platform,
            options,
            root: root.into(),
        }
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    /// Build the capslock command line.
    ///
    /// Flags come first; the baseline path, when present, is the only
    /// positional argument.
    pub fn invocation(
        &self,
        target: &[String],
        format: OutputFormat,
        baseline: Option<&Path>,
    ) -> Invocation {
        let mut inv = Invocation::new(self.program)
            .args(["-goos", self.platform.goos.as_str()])
            .args(["-goarch", self.platform.goarch.as_str()])
            .args(["-output", format.as_str()]);
        if let Some(map) = &self.options.capability_map {
            inv = inv.arg(format!("-capability_map={}", map.display()));
            if self.options.disable_builtin {
                inv = inv.arg("-disable_builtin");
            }
        }
        inv = inv.arg("-packages").arg(target.join(","));
        if let Some(path) = baseline {
            inv = inv.arg(path.display().to_string());
        }
        inv.current_dir(&self.root)
    }

    fn analyze(
        &self,
        target: &[String],
        format: OutputFormat,
        baseline: Option<&Path>,
    ) -> Result<Vec<u8>> {
        let invocation = self.invocation(target, format, baseline);
        log::debug!(
            "running capslock -output {} on {} packages",
            format,
            target.len()
        );
        let out = self.runner.run(&invocation)?;
        if !out.is_success() {
            return Err(CaplockError::analyzer(
                out.status_text(),
                out.stderr_lossy().trim(),
            ));
        }
        Ok(out.stdout)
    }

    /// Run the verbose analysis and persist it to `caps.summary`.
    pub fn write_summary(&self, target: &[String]) -> Result<Vec<u8>> {
        let summary = self.analyze(target, OutputFormat::Verbose, None)?;
        let path = self.summary_path();
        io::write_file(&path, &summary)?;
        log::info!("wrote {}", path.display());
        Ok(summary)
    }

    /// Run the JSON analysis and persist it to `caps.lock`.
    pub fn write_lock(&self, target: &[String]) -> Result<Vec<u8>> {
        let lock = self.analyze(target, OutputFormat::Json, None)?;
        let path = self.lock_path();
        io::write_file(&path, &lock)?;
        log::info!("wrote {}", path.display());
        Ok(lock)
    }

    /// Compare the current target against the baseline at `lock_path`.
    ///
    /// Returns capslock's output unchanged; empty output means no change.
    /// When capslock fails and the baseline is absent, the error carries a
    /// hint to create one.
    pub fn compare(&self, target: &[String], lock_path: &Path) -> Result<Vec<u8>> {
        self.analyze(target, OutputFormat::Compare, Some(lock_path))
            .map_err(|err| match err {
                CaplockError::Analyzer { status, stderr } if !io::file_exists(lock_path) => {
                    CaplockError::analyzer(
                        status,
                        format!(
                            "{stderr} (no baseline at {}; run with -lock to create one)",
                            lock_path.display()
                        ),
                    )
                }
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CommandOutput;
    use crate::testkit::ScriptedRunner;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn target() -> Vec<String> {
        vec!["example.com/a".to_string(), "example.com/b".to_string()]
    }

    fn platform() -> Platform {
        Platform::new("linux", "amd64")
    }

    #[test]
    fn test_invocation_arguments() {
        let runner = ScriptedRunner::new();
        let platform = platform();
        let options = AnalyzerOptions::default();
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, "/src/m");

        let inv = store.invocation(&target(), OutputFormat::Json, None);
        assert_eq!(
            inv.arguments(),
            [
                "-goos",
                "linux",
                "-goarch",
                "amd64",
                "-output",
                "json",
                "-packages",
                "example.com/a,example.com/b",
            ]
        );
        assert_eq!(inv.dir(), Some(Path::new("/src/m")));
    }

    #[test]
    fn test_invocation_with_custom_map_and_baseline() {
        let runner = ScriptedRunner::new();
        let platform = platform();
        let options = AnalyzerOptions {
            capability_map: Some(PathBuf::from("/src/m/custom.cm")),
            disable_builtin: true,
        };
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, "/src/m");

        let inv = store.invocation(
            &target(),
            OutputFormat::Compare,
            Some(Path::new("/src/m/caps.lock")),
        );
        assert_eq!(
            inv.arguments(),
            [
                "-goos",
                "linux",
                "-goarch",
                "amd64",
                "-output",
                "compare",
                "-capability_map=/src/m/custom.cm",
                "-disable_builtin",
                "-packages",
                "example.com/a,example.com/b",
                "/src/m/caps.lock",
            ]
        );
    }

    #[test]
    fn test_write_summary_and_lock_persist_raw_output() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .on(
                "capslock",
                &["-output", "verbose"],
                CommandOutput::success("Capslock summary\nCAPABILITY_NETWORK: 1\n"),
            )
            .on(
                "capslock",
                &["-output", "json"],
                CommandOutput::success("{\"capabilityInfo\": []}\n"),
            );
        let platform = platform();
        let options = AnalyzerOptions::default();
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, dir.path());

        let summary = store.write_summary(&target()).unwrap();
        let lock = store.write_lock(&target()).unwrap();

        assert_eq!(fs::read(dir.path().join(SUMMARY_FILE)).unwrap(), summary);
        assert_eq!(fs::read(dir.path().join(LOCK_FILE)).unwrap(), lock);
        assert_eq!(lock, b"{\"capabilityInfo\": []}\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_written_files_are_group_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let runner =
            ScriptedRunner::new().on("capslock", &["-output"], CommandOutput::success("{}"));
        let platform = platform();
        let options = AnalyzerOptions::default();
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, dir.path());
        store.write_lock(&target()).unwrap();

        let mode = fs::metadata(store.lock_path()).unwrap().permissions().mode();
        // umask may clear bits but never adds execute
        assert_eq!(mode & 0o111, 0);
        assert_eq!(mode & 0o400, 0o400);
    }

    #[test]
    fn test_analyzer_failure_is_analyzer_error() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new().on(
            "capslock",
            &["-output"],
            CommandOutput::failure(2, "capslock: packages failed to load\n"),
        );
        let platform = platform();
        let options = AnalyzerOptions::default();
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, dir.path());

        let err = store.write_summary(&target()).unwrap_err();
        match &err {
            CaplockError::Analyzer { status, stderr } => {
                assert_eq!(status, "exit status 2");
                assert_eq!(stderr, "capslock: packages failed to load");
            }
            other => panic!("expected Analyzer error, got {other:?}"),
        }
        assert!(!store.summary_path().exists());
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let runner =
            ScriptedRunner::new().on("capslock", &["-output"], CommandOutput::success("{}"));
        let platform = platform();
        let options = AnalyzerOptions::default();
        let root = dir.path().join("does-not-exist");
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, &root);

        let err = store.write_lock(&target()).unwrap_err();
        assert!(matches!(err, CaplockError::Io { .. }));
    }

    #[test]
    fn test_compare_returns_output_verbatim() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCK_FILE), "{}").unwrap();
        let diff = "Package example.com/a has new capability CAPABILITY_EXEC\n";
        let runner = ScriptedRunner::new().on(
            "capslock",
            &["-output", "compare"],
            CommandOutput::success(diff),
        );
        let platform = platform();
        let options = AnalyzerOptions::default();
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, dir.path());

        let out = store.compare(&target(), &store.lock_path()).unwrap();
        assert_eq!(out, diff.as_bytes());

        let call = &runner.calls()[0];
        assert_eq!(
            call.arguments().last().map(String::as_str),
            Some(store.lock_path().to_str().unwrap())
        );
    }

    #[test]
    fn test_compare_without_baseline_hints_lock() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new().on(
            "capslock",
            &["-output", "compare"],
            CommandOutput::failure(1, "open caps.lock: no such file or directory\n"),
        );
        let platform = platform();
        let options = AnalyzerOptions::default();
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, dir.path());

        let err = store.compare(&target(), &store.lock_path()).unwrap_err();
        assert!(matches!(err, CaplockError::Analyzer { .. }));
        assert_eq!(err.exit_code(), crate::errors::ExitStatus::INTERNAL_ERROR);
        assert!(err.to_string().contains("run with -lock"));
        assert_eq!(runner.calls_to("capslock").len(), 1);
    }

    #[test]
    fn test_compare_failure_with_baseline_is_unchanged() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCK_FILE), "not json").unwrap();
        let runner = ScriptedRunner::new().on(
            "capslock",
            &["-output", "compare"],
            CommandOutput::failure(1, "invalid baseline\n"),
        );
        let platform = platform();
        let options = AnalyzerOptions::default();
        let store = BaselineStore::new(&runner, "capslock", &platform, &options, dir.path());

        let err = store.compare(&target(), &store.lock_path()).unwrap_err();
        assert_eq!(err.to_string(), "capslock: exit status 1: invalid baseline");
    }
}
