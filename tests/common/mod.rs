// Test utility module for caplock integration tests
#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_GO: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$@" >> "$dir/go.args"
case "$1" in
env)
    cat "$dir/gomod"
    ;;
list)
    if [ "$2" = "-e" ]; then
        cat "$dir/golist.json"
        exit 0
    fi
    if grep -qx "$3" "$dir/stdlib"; then echo true; else echo false; fi
    ;;
*)
    echo "fake go: unsupported $1" >&2
    exit 2
    ;;
esac
"#;

const FAKE_CAPSLOCK: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$@" >> "$dir/capslock.args"
if [ -f "$dir/capslock.fail" ]; then
    cat "$dir/capslock.fail" >&2
    exit 3
fi
format=""
pkgs=""
last=""
while [ $# -gt 0 ]; do
    case "$1" in
    -output) format="$2"; shift 2 ;;
    -packages) pkgs="$2"; shift 2 ;;
    -goos|-goarch) shift 2 ;;
    *) last="$1"; shift ;;
    esac
done
current="{\"packages\":\"$pkgs\"}"
case "$format" in
json) echo "$current" ;;
verbose) echo "Capslock summary for $pkgs" ;;
compare)
    if [ ! -f "$last" ]; then
        echo "open $last: no such file or directory" >&2
        exit 1
    fi
    previous=$(cat "$last")
    if [ "$previous" != "$current" ]; then
        echo "capabilities changed: $previous -> $current"
    fi
    ;;
esac
"#;

/// A fake Go module plus fake `go` and `capslock` programs.
pub struct TestModule {
    _tmp: TempDir,
    pub root: PathBuf,
    pub bin: PathBuf,
}

impl TestModule {
    /// A module `example.com/m` whose root package imports `imports`.
    pub fn new(imports: &[&str]) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("m");
        let bin = tmp.path().join("bin");
        fs::create_dir_all(&root).expect("create module dir");
        fs::create_dir_all(&bin).expect("create bin dir");
        fs::write(root.join("go.mod"), "module example.com/m\n").expect("write go.mod");

        write_script(&bin.join("go"), FAKE_GO);
        write_script(&bin.join("capslock"), FAKE_CAPSLOCK);
        fs::write(bin.join("gomod"), format!("{}\n", root.join("go.mod").display()))
            .expect("write gomod");
        fs::write(bin.join("stdlib"), "fmt\nos\nnet/http\nstrings\n").expect("write stdlib");

        let module = Self {
            _tmp: tmp,
            root,
            bin,
        };
        module.set_imports(imports);
        module
    }

    /// Replace what the root package imports.
    pub fn set_imports(&self, imports: &[&str]) {
        let listing = serde_json::json!({
            "ImportPath": "example.com/m",
            "Module": {"Path": "example.com/m", "Main": true},
            "Imports": imports,
        });
        fs::write(
            self.bin.join("golist.json"),
            serde_json::to_string_pretty(&listing).expect("serialize listing"),
        )
        .expect("write golist.json");
    }

    /// Make `go env GOMOD` report something else.
    pub fn set_gomod(&self, gomod: &str) {
        fs::write(self.bin.join("gomod"), format!("{gomod}\n")).expect("write gomod");
    }

    /// Make capslock fail with `stderr`.
    pub fn fail_capslock(&self, stderr: &str) {
        fs::write(self.bin.join("capslock.fail"), stderr).expect("write capslock.fail");
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("caplock");
        cmd.current_dir(&self.root)
            .env("CAPLOCK_GO", self.bin.join("go"))
            .env("CAPLOCK_CAPSLOCK", self.bin.join("capslock"))
            .env_remove("CAPLOCK_LOG");
        cmd
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join("caps.lock")
    }

    pub fn summary_file(&self) -> PathBuf {
        self.root.join("caps.summary")
    }

    /// Argument lines of every call to a fake program, oldest first.
    pub fn calls(&self, program: &str) -> Vec<String> {
        fs::read_to_string(self.bin.join(format!("{program}.args")))
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod script");
}
