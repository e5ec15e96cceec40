//! Environment lifecycle: create, probe, reuse, and rebuild per-tool
//! isolated environments.
//!
//! Each tool owns exactly one environment, nested under the tool's own
//! directory (`<tool>/<env-dir>`). An existing environment is trusted only
//! after a liveness probe of its interpreter; a broken one is deleted and
//! recreated, with exactly one retry before the tool is given up on.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ProvisionConfig;
use crate::discovery::ToolDescriptor;
use crate::error::EnvironmentError;
use crate::process::{CommandRunner, Invocation};

/// Creation attempts per tool (initial + one retry).
const MAX_CREATE_ATTEMPTS: u32 = 2;

/// A tool's isolated runtime environment. `interpreter_path` always points
/// inside `environment_path`; the handle is only returned healthy.
#[derive(Debug, Clone)]
pub struct EnvironmentHandle {
    pub tool_name: String,
    pub environment_path: PathBuf,
    pub interpreter_path: PathBuf,
    pub healthy: bool,
    /// True when a pre-existing environment passed the liveness probe and
    /// creation was skipped. Dependency sync is a separate decision.
    pub reused: bool,
}

/// Ensure a healthy environment exists for `tool`, creating or rebuilding
/// as needed.
pub fn ensure_environment(
    tool: &ToolDescriptor,
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
) -> Result<EnvironmentHandle, EnvironmentError> {
    let env_path = tool.root_path.join(&cfg.env_dir_name);
    let interpreter = interpreter_path(&env_path);

    if env_path.exists() {
        if probe_interpreter(&interpreter, cfg, runner) {
            tracing::info!(tool = %tool.name, env = %env_path.display(), "reusing healthy environment");
            return Ok(EnvironmentHandle {
                tool_name: tool.name.clone(),
                environment_path: env_path,
                interpreter_path: interpreter,
                healthy: true,
                reused: true,
            });
        }

        tracing::warn!(tool = %tool.name, env = %env_path.display(), "environment failed liveness probe, rebuilding");
        fs::remove_dir_all(&env_path).map_err(|e| EnvironmentError::CreationFailed {
            detail: format!("failed to remove broken environment: {e}"),
        })?;
    }

    create_environment(tool, &env_path, &interpreter, cfg, runner)?;
    tracing::info!(tool = %tool.name, env = %env_path.display(), "environment created");

    Ok(EnvironmentHandle {
        tool_name: tool.name.clone(),
        environment_path: env_path,
        interpreter_path: interpreter,
        healthy: true,
        reused: false,
    })
}

/// The interpreter a POSIX venv exposes.
pub fn interpreter_path(env_path: &Path) -> PathBuf {
    env_path.join("bin").join("python")
}

/// Liveness probe: the interpreter exists and answers `--version` within
/// the probe timeout. Any failure (including a timeout or a spawn error)
/// marks the environment broken; it is never fatal by itself.
fn probe_interpreter(
    interpreter: &Path,
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
) -> bool {
    if !interpreter.is_file() {
        return false;
    }
    runner
        .run(
            &Invocation::new(interpreter)
                .arg("--version")
                .timeout_secs(cfg.probe_timeout_secs),
        )
        .map(|out| out.success())
        .unwrap_or(false)
}

/// Locate a working system interpreter to bootstrap venv creation.
fn system_python(
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
) -> Result<PathBuf, EnvironmentError> {
    for name in ["python3", "python"] {
        let alive = runner
            .run(
                &Invocation::new(name)
                    .arg("--version")
                    .timeout_secs(cfg.probe_timeout_secs),
            )
            .map(|out| out.success())
            .unwrap_or(false);
        if alive {
            return Ok(PathBuf::from(name));
        }
    }
    Err(EnvironmentError::NoSystemInterpreter)
}

fn create_environment(
    tool: &ToolDescriptor,
    env_path: &Path,
    interpreter: &Path,
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
) -> Result<(), EnvironmentError> {
    let python = system_python(cfg, runner)?;
    let mut last_detail = String::new();

    for attempt in 1..=MAX_CREATE_ATTEMPTS {
        let invocation = Invocation::new(&python)
            .args(["-m", "venv"])
            .arg(env_path.to_string_lossy())
            .cwd(&tool.root_path)
            .timeout_secs(cfg.create_timeout_secs);

        let out = runner
            .run(&invocation)
            .map_err(|e| EnvironmentError::CreationFailed {
                detail: format!("failed to spawn '{}': {e}", invocation.describe()),
            })?;

        if out.timed_out {
            return Err(EnvironmentError::Timeout {
                command: invocation.describe(),
                secs: cfg.create_timeout_secs,
            });
        }

        if out.success() {
            if interpreter.is_file() {
                return Ok(());
            }
            last_detail = format!(
                "'{}' exited 0 but '{}' is missing",
                invocation.describe(),
                interpreter.display()
            );
        } else {
            last_detail = out.failure_detail();
        }

        tracing::warn!(
            tool = %tool.name,
            attempt,
            detail = %last_detail,
            "environment creation attempt failed"
        );

        // Clear any partial directory before the retry.
        if env_path.exists() {
            let _ = fs::remove_dir_all(env_path);
        }
    }

    Err(EnvironmentError::CreationFailed {
        detail: last_detail,
    })
}
