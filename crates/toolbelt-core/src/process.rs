//! Subprocess invocation behind a small capability interface.
//!
//! Every external call the orchestrator makes (environment creation,
//! dependency installation, liveness probes) goes through [`CommandRunner`]
//! so unit tests can substitute a fake instead of spawning real processes.
//! [`SystemRunner`] is the production implementation: blocking, with a
//! bounded timeout after which the child is killed.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a child process.
const WAIT_POLL_INTERVAL_MS: u64 = 100;

/// A single external command to run: program, arguments, working directory,
/// and the timeout after which the process is killed.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Human-readable command line, used in logs and error detail.
    pub fn describe(&self) -> String {
        let mut s = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            s.push(' ');
            s.push_str(arg);
        }
        s
    }
}

/// Captured result of a finished (or killed) subprocess.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// stderr if non-empty, otherwise stdout; installers differ on where
    /// they report failure.
    pub fn failure_detail(&self) -> String {
        let err = self.stderr.trim();
        if !err.is_empty() {
            return err.to_string();
        }
        self.stdout.trim().to_string()
    }
}

/// Capability interface for running external commands.
///
/// Spawn failures (missing binary, unreadable cwd) surface as `Err`; a
/// process that ran and failed, or was killed on timeout, is an `Ok` output
/// with a non-zero exit code or `timed_out` set.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessOutput>;
}

/// Production runner: spawns the process, drains stdout/stderr on reader
/// threads, polls `try_wait`, and kills the child when the timeout elapses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = invocation.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %invocation.describe(), "spawning");
        let mut child = cmd.spawn()?;

        // Drain pipes on threads while polling: a chatty child must never
        // block on a full pipe while we wait for it to exit.
        let stdout_thread = child.stdout.take().map(|mut out| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = out.read_to_end(&mut buf);
                buf
            })
        });
        let stderr_thread = child.stderr.take().map(|mut err| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = err.read_to_end(&mut buf);
                buf
            })
        });

        let start = Instant::now();
        let poll = Duration::from_millis(WAIT_POLL_INTERVAL_MS);
        let (exit_code, timed_out) = loop {
            match child.try_wait()? {
                Some(status) => break (status.code().unwrap_or(-1), false),
                None => {
                    if start.elapsed() > invocation.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        tracing::warn!(
                            command = %invocation.describe(),
                            timeout_secs = invocation.timeout.as_secs(),
                            "killed: exceeded timeout"
                        );
                        break (-1, true);
                    }
                    thread::sleep(poll);
                }
            }
        };

        let read_pipe = |handle: Option<thread::JoinHandle<Vec<u8>>>| {
            handle
                .and_then(|h| h.join().ok())
                .map(|buf| String::from_utf8_lossy(&buf).into_owned())
                .unwrap_or_default()
        };

        Ok(ProcessOutput {
            stdout: read_pipe(stdout_thread),
            stderr: read_pipe(stderr_thread),
            exit_code,
            timed_out,
        })
    }
}
