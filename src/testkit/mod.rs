//! Testing infrastructure for caplock.
//!
//! - **[`ScriptedRunner`]**: a [`CommandRunner`](crate::io::CommandRunner)
//!   that answers `go` and `capslock` invocations from canned output and
//!   records what was run
//! - **[`helpers`]**: builders for `go list -json` output
//!
//! # Quick Start
//!
//! ```rust
//! use caplock::io::CommandOutput;
//! use caplock::testkit::{go_list_json, FakePackage, ScriptedRunner};
//!
//! let listing = go_list_json(&[
//!     FakePackage::new("example.com/m", "example.com/m").imports(&["fmt", "example.com/a"]),
//! ]);
//! let runner = ScriptedRunner::new()
//!     .on("go", &["env", "GOMOD"], CommandOutput::success("/src/m/go.mod\n"))
//!     .on("go", &["list", "-e"], CommandOutput::success(listing))
//!     .on("go", &["list", "fmt"], CommandOutput::success("true\n"))
//!     .on("go", &["list"], CommandOutput::success("false\n"));
//! # let _ = runner;
//! ```

pub mod helpers;
pub mod mock_env;

pub use helpers::{go_list_json, FakePackage};
pub use mock_env::ScriptedRunner;
