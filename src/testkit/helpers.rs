//! Builders for fake `go list -json` output.

use serde_json::json;

/// One package as reported by `go list -json`.
#[derive(Debug, Clone, Default)]
pub struct FakePackage {
    pub import_path: String,
    pub module: Option<String>,
    pub imports: Vec<String>,
    pub error: Option<String>,
}

impl FakePackage {
    pub fn new(import_path: &str, module: &str) -> Self {
        Self {
            import_path: import_path.to_string(),
            module: Some(module.to_string()),
            ..Self::default()
        }
    }

    /// A package outside any module (GOPATH mode or a bare directory).
    pub fn without_module(import_path: &str) -> Self {
        Self {
            import_path: import_path.to_string(),
            ..Self::default()
        }
    }

    pub fn imports(mut self, imports: &[&str]) -> Self {
        self.imports = imports.iter().map(|i| i.to_string()).collect();
        self
    }

    pub fn error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    fn to_json(&self) -> serde_json::Value {
        let mut value = json!({ "ImportPath": self.import_path });
        if !self.imports.is_empty() {
            value["Imports"] = json!(self.imports);
        }
        if let Some(module) = &self.module {
            value["Module"] = json!({ "Path": module, "Main": true });
        }
        if let Some(err) = &self.error {
            value["Error"] = json!({ "ImportStack": [], "Pos": "", "Err": err });
        }
        value
    }
}

/// Render packages the way `go list -json` prints them: one indented JSON
/// object after another, not a JSON array.
pub fn go_list_json(packages: &[FakePackage]) -> String {
    packages
        .iter()
        .map(|pkg| format!("{:#}\n", pkg.to_json()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::parse_package_stream;

    #[test]
    fn test_listing_is_a_stream_of_objects() {
        let listing = go_list_json(&[
            FakePackage::new("example.com/m", "example.com/m").imports(&["fmt"]),
            FakePackage::without_module("tool").error("no Go files"),
        ]);
        assert!(!listing.trim_start().starts_with('['));
        assert!(listing.contains("\n  \"ImportPath\""));

        let packages = parse_package_stream(listing.as_bytes()).unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].imports, vec!["fmt"]);
        assert_eq!(packages[1].module_path(), None);
        assert_eq!(packages[1].errors().count(), 1);
    }
}
