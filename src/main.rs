use std::io::Write;
use std::process::ExitCode;

use caplock::cli::{normalize_go_flags, Cli};
use caplock::errors::{CaplockError, ExitStatus};
use caplock::io::SystemRunner;
use clap::Parser;

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse_from(normalize_go_flags(std::env::args_os()));
    run(&cli).into()
}

// Logs go to stderr; stdout carries only listings and analyzer output.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("CAPLOCK_LOG", "warn"))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> ExitStatus {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => return report(&CaplockError::io(".", e)),
    };

    let config = match caplock::config::resolve_config(cli, &cwd) {
        Ok(config) => config,
        Err(e) => return report(&e),
    };
    log::debug!("{config:?}");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let status = match caplock::commands::run(&config, &SystemRunner::new(), &cwd, &mut out) {
        Ok(status) => status,
        Err(e) => report(&e),
    };
    if let Err(e) = out.flush() {
        return report(&CaplockError::io("<stdout>", e));
    }
    status
}

fn report(err: &CaplockError) -> ExitStatus {
    eprintln!("caplock: {err}");
    err.exit_code()
}
