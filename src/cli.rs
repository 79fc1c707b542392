use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Long flags that take a separate value (`-goos linux`).
const VALUE_FLAGS: &[&str] = &["capability_map", "goos", "goarch", "go-program", "capslock-program"];

#[derive(Parser, Debug, Clone)]
#[command(name = "caplock")]
#[command(
    about = "Runs capslock on every package imported by a Go module and keeps a capability baseline",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Use a custom capability map file
    #[arg(long = "capability_map", value_name = "PATH", allow_hyphen_values = true)]
    pub capability_map: Option<PathBuf>,

    /// Disable the builtin capability mappings when using a custom capability map
    #[arg(
        long = "disable_builtin",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub disable_builtin: Option<bool>,

    /// GOARCH to use for analysis (defaults to the host)
    #[arg(long, allow_hyphen_values = true)]
    pub goarch: Option<String>,

    /// GOOS to use for analysis (defaults to the host)
    #[arg(long, allow_hyphen_values = true)]
    pub goos: Option<String>,

    /// Imported package path patterns to ignore (allows multiple instances)
    #[arg(
        short = 'i',
        value_name = "PATTERN",
        action = ArgAction::Append,
        allow_hyphen_values = true
    )]
    pub ignore: Vec<String>,

    /// List imports that would be analysed and then exit
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub imports: bool,

    /// Write out a new lock file
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub lock: bool,

    /// Include the whole main module
    #[arg(
        long = "mod",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = true,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub module: bool,

    /// Include stdlib packages in analysis
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub stdlib: bool,

    /// Print verbose output
    #[arg(
        short = 'v',
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub verbose: bool,

    /// Go tool to run
    #[arg(long = "go-program", env = "CAPLOCK_GO", default_value = "go", hide = true)]
    pub go_program: String,

    /// Capslock binary to run
    #[arg(
        long = "capslock-program",
        env = "CAPLOCK_CAPSLOCK",
        default_value = "capslock",
        hide = true
    )]
    pub capslock_program: String,
}

/// Rewrite Go-style single-dash long flags (`-lock`, `-goos=linux`) into the
/// double-dash form clap parses. Single-letter flags take one dash whichever
/// form was given (`--i` becomes `-i`). Values of value-taking flags and
/// everything after `--` pass through untouched.
pub fn normalize_go_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let mut normalized: Vec<OsString> = iter.next().into_iter().collect();
    let mut expect_value = false;
    let mut passthrough = false;

    for arg in iter {
        if passthrough || expect_value {
            expect_value = false;
            normalized.push(arg);
            continue;
        }
        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };
        if text == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let name = text.trim_start_matches('-');
        let dashes = text.len() - name.len();
        let (flag, has_value) = match name.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (name, false),
        };

        if name.is_empty() || dashes == 0 {
            normalized.push(arg);
        } else if (dashes == 1 || dashes == 2) && flag.len() == 1 {
            // -i PATTERN, --v
            expect_value = flag == "i" && !has_value;
            normalized.push(OsString::from(format!("-{name}")));
        } else if dashes == 1 || dashes == 2 {
            expect_value = !has_value && VALUE_FLAGS.contains(&flag);
            normalized.push(OsString::from(format!("--{name}")));
        } else {
            normalized.push(arg);
        }
    }
    normalized
}
