//! Dependency synchronization: install a tool's manifest into its
//! environment.
//!
//! Two steps, in order: upgrade the environment's own pip (older installers
//! can mis-resolve newer declared packages; failure here only degrades),
//! then install the full manifest as one transaction. A failed manifest
//! install leaves the environment on disk for inspection; the caller marks
//! the tool failed and skips publishing.

use std::path::Path;

use crate::config::ProvisionConfig;
use crate::envs::EnvironmentHandle;
use crate::error::EnvironmentError;
use crate::process::{CommandRunner, Invocation};

pub fn sync_dependencies(
    handle: &EnvironmentHandle,
    manifest: &Path,
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
) -> Result<(), EnvironmentError> {
    upgrade_pip(handle, cfg, runner);
    install_manifest(handle, manifest, cfg, runner)
}

/// Best-effort pip self-upgrade. Never fatal: the bundled pip can usually
/// still install the manifest.
fn upgrade_pip(handle: &EnvironmentHandle, cfg: &ProvisionConfig, runner: &dyn CommandRunner) {
    let invocation = Invocation::new(&handle.interpreter_path)
        .args(["-m", "pip", "install", "--upgrade", "pip"])
        .timeout_secs(cfg.install_timeout_secs);

    match runner.run(&invocation) {
        Ok(out) if out.success() => {
            tracing::debug!(tool = %handle.tool_name, "pip is up to date");
        }
        Ok(out) => {
            tracing::warn!(
                tool = %handle.tool_name,
                detail = %out.failure_detail(),
                "pip self-upgrade failed, continuing with bundled pip"
            );
        }
        Err(e) => {
            tracing::warn!(
                tool = %handle.tool_name,
                error = %e,
                "pip self-upgrade could not be spawned, continuing with bundled pip"
            );
        }
    }
}

fn install_manifest(
    handle: &EnvironmentHandle,
    manifest: &Path,
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
) -> Result<(), EnvironmentError> {
    let invocation = Invocation::new(&handle.interpreter_path)
        .args(["-m", "pip", "install", "-r"])
        .arg(manifest.to_string_lossy())
        .timeout_secs(cfg.install_timeout_secs);

    let out = runner
        .run(&invocation)
        .map_err(|e| EnvironmentError::DependencyInstallFailed {
            detail: format!("failed to spawn '{}': {e}", invocation.describe()),
        })?;

    if out.timed_out {
        return Err(EnvironmentError::Timeout {
            command: invocation.describe(),
            secs: cfg.install_timeout_secs,
        });
    }
    if !out.success() {
        return Err(EnvironmentError::DependencyInstallFailed {
            detail: out.failure_detail(),
        });
    }

    tracing::info!(tool = %handle.tool_name, manifest = %manifest.display(), "dependencies synchronized");
    Ok(())
}
