//! Scripted process runner for testing caplock without a Go toolchain.
//!
//! [`ScriptedRunner`] implements [`CommandRunner`] by matching each
//! invocation against a list of rules and returning the canned output of the
//! first match. Every invocation is recorded so tests can assert on what
//! would have been executed.
//!
//! # Matching
//!
//! A rule matches when the program name is equal and every needle appears
//! among the invocation's arguments. Rules are tried in insertion order, so
//! put specific rules before general ones.
//!
//! # Example
//!
//! ```rust
//! use caplock::io::{CommandOutput, CommandRunner, Invocation};
//! use caplock::testkit::ScriptedRunner;
//!
//! let runner = ScriptedRunner::new()
//!     .on("go", &["env", "GOMOD"], CommandOutput::success("/src/m/go.mod\n"));
//!
//! let out = runner.run(&Invocation::new("go").args(["env", "GOMOD"])).unwrap();
//! assert_eq!(out.stdout_lossy(), "/src/m/go.mod\n");
//! assert_eq!(runner.calls().len(), 1);
//! ```

use crate::errors::CaplockError;
use crate::io::traits::{CommandOutput, CommandRunner, Invocation};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct Rule {
    program: String,
    needles: Vec<String>,
    response: Option<CommandOutput>,
}

impl Rule {
    fn matches(&self, invocation: &Invocation) -> bool {
        self.program == invocation.program()
            && self
                .needles
                .iter()
                .all(|needle| invocation.arguments().contains(needle))
    }
}

/// In-memory [`CommandRunner`] answering from scripted rules.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Arc<RwLock<Vec<Invocation>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer invocations of `program` containing all `needles` with `output`.
    pub fn on(mut self, program: &str, needles: &[&str], output: CommandOutput) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            needles: needles.iter().map(|n| n.to_string()).collect(),
            response: Some(output),
        });
        self
    }

    /// Make `program` behave as if it were not installed.
    pub fn missing(mut self, program: &str) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            needles: Vec::new(),
            response: None,
        });
        self
    }

    /// All invocations so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.read().expect("Lock poisoned").clone()
    }

    /// Invocations of one program, in order.
    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.program() == program)
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CaplockError> {
        self.calls
            .write()
            .expect("Lock poisoned")
            .push(invocation.clone());

        match self.rules.iter().find(|rule| rule.matches(invocation)) {
            Some(Rule {
                response: Some(output),
                ..
            }) => Ok(output.clone()),
            Some(Rule { response: None, .. }) => Err(CaplockError::environment(format!(
                "{}: cannot find binary path",
                invocation.program()
            ))),
            None => Err(CaplockError::environment(format!(
                "no scripted response for `{}`",
                invocation.command_line()
            ))),
        }
    }
}
