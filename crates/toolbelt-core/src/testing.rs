//! Test doubles shared by the unit tests: a scripted [`CommandRunner`] so
//! the env lifecycle, dependency sync, and coordinator can be exercised
//! without creating real virtualenvs or spawning pip.

use std::cell::RefCell;
use std::io;

use crate::process::{CommandRunner, Invocation, ProcessOutput};

type SideEffect = Box<dyn Fn(&Invocation)>;

/// Scripted response for a matched invocation.
pub enum FakeResponse {
    Succeed { stdout: String, stderr: String },
    Fail { exit_code: i32, stderr: String },
    TimeOut,
    SpawnError(io::ErrorKind),
}

impl FakeResponse {
    pub fn ok() -> Self {
        Self::Succeed {
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn fail(exit_code: i32, stderr: &str) -> Self {
        Self::Fail {
            exit_code,
            stderr: stderr.to_string(),
        }
    }
}

struct Rule {
    /// Substring matched against `Invocation::describe()`.
    needle: String,
    response: FakeResponse,
    side_effect: Option<SideEffect>,
}

/// Rule-based fake: first matching rule wins, unmatched invocations succeed
/// with empty output. Records every command line it sees.
#[derive(Default)]
pub struct FakeRunner {
    rules: Vec<Rule>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, response: FakeResponse) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            response,
            side_effect: None,
        });
        self
    }

    /// Like [`Self::on`], with a filesystem side effect (e.g. materialize
    /// the interpreter a successful `python -m venv` would have created).
    pub fn on_with(
        mut self,
        needle: &str,
        response: FakeResponse,
        effect: impl Fn(&Invocation) + 'static,
    ) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            response,
            side_effect: Some(Box::new(effect)),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count_calls(&self, needle: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        let line = invocation.describe();
        self.calls.borrow_mut().push(line.clone());

        for rule in &self.rules {
            if !line.contains(&rule.needle) {
                continue;
            }
            if let Some(ref effect) = rule.side_effect {
                effect(invocation);
            }
            return match &rule.response {
                FakeResponse::Succeed { stdout, stderr } => Ok(ProcessOutput {
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                    exit_code: 0,
                    timed_out: false,
                }),
                FakeResponse::Fail { exit_code, stderr } => Ok(ProcessOutput {
                    stdout: String::new(),
                    stderr: stderr.clone(),
                    exit_code: *exit_code,
                    timed_out: false,
                }),
                FakeResponse::TimeOut => Ok(ProcessOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: -1,
                    timed_out: true,
                }),
                FakeResponse::SpawnError(kind) => {
                    Err(io::Error::new(*kind, "spawn failed (fake)"))
                }
            };
        }

        Ok(ProcessOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            timed_out: false,
        })
    }
}
