use std::path::PathBuf;

use crate::filter::PatternSet;

/// GOOS/GOARCH pair used for package loading and analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub goos: String,
    pub goarch: String,
}

impl Platform {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// The platform this binary was built for, in Go's naming.
    pub fn host() -> Self {
        Self::new(host_goos(), host_goarch())
    }

    /// Environment overrides applied to every `go` invocation.
    pub fn env(&self) -> [(&'static str, &str); 2] {
        [("GOOS", self.goos.as_str()), ("GOARCH", self.goarch.as_str())]
    }
}

fn host_goos() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_goarch() -> &'static str {
    let little = cfg!(target_endian = "little");
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc64" if little => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if little => "mipsle",
        "mips64" if little => "mips64le",
        "wasm32" => "wasm",
        other => other,
    }
}

/// What a run does once the import set is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the analysis target and exit.
    ListImports,
    /// Write `caps.summary` and `caps.lock`.
    WriteBaseline,
    /// Compare the current state against `caps.lock`.
    Compare,
}

impl Mode {
    /// `-imports` wins over `-lock`.
    pub fn from_flags(list_imports: bool, lock: bool) -> Self {
        if list_imports {
            Mode::ListImports
        } else if lock {
            Mode::WriteBaseline
        } else {
            Mode::Compare
        }
    }
}

/// Options forwarded to every capslock run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerOptions {
    pub capability_map: Option<PathBuf>,
    /// Only meaningful together with `capability_map`.
    pub disable_builtin: bool,
}

/// Names (or paths) of the external programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programs {
    pub go: String,
    pub capslock: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            go: "go".to_string(),
            capslock: "capslock".to_string(),
        }
    }
}

/// Which packages end up in the analysis target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveScope {
    /// Load the whole main module instead of the tree under the current dir.
    pub whole_module: bool,
    /// Keep standard-library packages.
    pub include_stdlib: bool,
}

impl Default for ResolveScope {
    fn default() -> Self {
        Self {
            whole_module: true,
            include_stdlib: false,
        }
    }
}

/// Validated configuration for one run, built once at startup.
#[derive(Debug, Clone)]
pub struct LockConfig {
    pub mode: Mode,
    pub platform: Platform,
    pub scope: ResolveScope,
    pub ignore: PatternSet,
    pub analyzer: AnalyzerOptions,
    /// Echo the summary when writing a baseline.
    pub verbose: bool,
    pub programs: Programs,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Compare,
            platform: Platform::host(),
            scope: ResolveScope::default(),
            ignore: PatternSet::default(),
            analyzer: AnalyzerOptions::default(),
            verbose: false,
            programs: Programs::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_precedence() {
        assert_eq!(Mode::from_flags(true, true), Mode::ListImports);
        assert_eq!(Mode::from_flags(false, true), Mode::WriteBaseline);
        assert_eq!(Mode::from_flags(false, false), Mode::Compare);
    }

    #[test]
    fn test_host_platform_uses_go_names() {
        let host = Platform::host();
        assert!(!host.goos.is_empty());
        assert_ne!(host.goos, "macos");
        assert_ne!(host.goarch, "x86_64");
        assert_ne!(host.goarch, "aarch64");
    }

    #[test]
    fn test_platform_env() {
        let platform = Platform::new("linux", "arm64");
        assert_eq!(platform.env(), [("GOOS", "linux"), ("GOARCH", "arm64")]);
    }
}
