//! CLI command implementations for caplock.
//!
//! caplock has a single command whose behavior is selected by flags:
//! - **list** (`-imports`): print the analysis target
//! - **lock** (`-lock`): write a new `caps.lock`/`caps.summary` baseline
//! - **compare** (default): compare the current imports against `caps.lock`

pub mod lock;

pub use lock::run;
