//! Ignore patterns for import paths.

use crate::errors::{CaplockError, Result};
use regex::Regex;

/// A set of regular expressions; a path is ignored if any of them matches.
///
/// Matching is an unanchored search, so `cloud.google.com` ignores every
/// path containing that text. Write `^...$` for exact matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile every pattern. Duplicate sources are compiled once.
    pub fn compile<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled: Vec<Regex> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if compiled.iter().any(|re| re.as_str() == pattern) {
                continue;
            }
            let re = Regex::new(pattern).map_err(|e| {
                CaplockError::config(format!("invalid ignore pattern {pattern:?}: {e}"))
            })?;
            compiled.push(re);
        }
        Ok(Self { patterns: compiled })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
