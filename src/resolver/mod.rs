//! Import resolution: from a directory to the set of external packages it
//! imports.
//!
//! The resolver loads every package under the root, collects each direct
//! import, and drops:
//!
//! - imports from the importing package's own module
//! - imports matching an ignore pattern
//! - standard-library imports, unless requested otherwise
//!
//! The result is sorted so that listings and analyzer arguments are stable
//! across runs.

pub mod gotool;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{Platform, ResolveScope};
use crate::errors::{CaplockError, Result};
use crate::filter::PatternSet;
use crate::io::CommandRunner;

pub use gotool::{parse_package_stream, GoModule, GoPackage, GoTool, PackageError};

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Directory the packages were loaded from; baseline files live here.
    pub root: PathBuf,
    /// Sorted, deduplicated external import paths.
    pub imports: Vec<String>,
}

/// External import paths mapped to the packages importing them.
pub type ImportMap = BTreeMap<String, Vec<String>>;

/// Resolves the analysis target for a directory.
pub struct ImportResolver<'a, R: CommandRunner + ?Sized> {
    go: GoTool<'a, R>,
}

impl<'a, R: CommandRunner + ?Sized> ImportResolver<'a, R> {
    pub fn new(runner: &'a R, go_program: &'a str, platform: &'a Platform) -> Self {
        Self {
            go: GoTool::new(runner, go_program, platform),
        }
    }

    /// Pick the root: the module root, or `cwd` itself.
    pub fn root(&self, cwd: &Path, scope: ResolveScope) -> Result<PathBuf> {
        if scope.whole_module {
            self.go.module_root(cwd)
        } else {
            Ok(cwd.to_path_buf())
        }
    }

    /// Resolve the analysis target for `cwd`.
    pub fn resolve(
        &self,
        cwd: &Path,
        ignore: &PatternSet,
        scope: ResolveScope,
    ) -> Result<Resolution> {
        let root = self.root(cwd, scope)?;
        log::debug!("loading packages under {}", root.display());

        let packages = self.go.list_packages(&root)?;
        check_package_errors(&packages)?;

        let candidates = collect_imports(&packages, ignore);
        log::debug!(
            "{} packages import {} external paths",
            packages.len(),
            candidates.len()
        );

        let imports = if scope.include_stdlib {
            candidates.into_keys().collect()
        } else {
            self.drop_standard(&root, candidates)?
        };

        Ok(Resolution { root, imports })
    }

    /// Classify imports one at a time, stopping at the first failure.
    fn drop_standard(&self, root: &Path, candidates: ImportMap) -> Result<Vec<String>> {
        let mut imports = Vec::with_capacity(candidates.len());
        for (path, importers) in candidates {
            let standard = self.go.is_standard(root, &path).map_err(|e| {
                CaplockError::environment(format!(
                    "{}: {} imported by {}",
                    e,
                    path,
                    importers.join(",")
                ))
            })?;
            if standard {
                log::debug!("skipping standard library package {path}");
                continue;
            }
            imports.push(path);
        }
        Ok(imports)
    }
}

/// Fail when any loaded package reported an error.
pub fn check_package_errors(packages: &[GoPackage]) -> Result<()> {
    let errors: Vec<String> = packages.iter().flat_map(GoPackage::errors).collect();
    if errors.is_empty() {
        return Ok(());
    }
    for err in &errors {
        log::warn!("package error: {err}");
    }
    Err(CaplockError::load(errors.join("\n")))
}

/// Direct imports of `packages` that are neither self-module nor ignored,
/// with the packages importing each one.
pub fn collect_imports(packages: &[GoPackage], ignore: &PatternSet) -> ImportMap {
    let mut imports = ImportMap::new();
    for pkg in packages {
        let module = pkg.module_path();
        for import in &pkg.imports {
            if module.is_some_and(|m| import.starts_with(m)) {
                continue;
            }
            if ignore.matches(import) {
                continue;
            }
            imports
                .entry(import.clone())
                .or_default()
                .push(pkg.import_path.clone());
        }
    }
    imports
}
