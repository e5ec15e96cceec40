//! Error taxonomy for the provisioning pipeline.
//!
//! Per-tool errors (`EnvironmentError`, `WrapperError`, `InstallError`) are
//! caught at the tool-pipeline boundary, recorded as a failed outcome, and
//! the run continues with the next tool. `DiscoveryError` aborts the whole
//! run before any per-tool work starts.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating tool directories. Always run-fatal.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("tool root '{}' does not exist or is not a directory", .0.display())]
    RootNotFound(PathBuf),

    #[error("failed to read tool root '{}': {source}", .dir.display())]
    Unreadable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no tool directories found under '{}'", .0.display())]
    NoToolsFound(PathBuf),
}

/// Errors from environment creation, liveness probing, or dependency sync.
/// Fatal for the affected tool only.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("no python3 or python interpreter found in PATH")]
    NoSystemInterpreter,

    #[error("failed to create environment: {detail}")]
    CreationFailed { detail: String },

    #[error("'{command}' timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("dependency install failed: {detail}")]
    DependencyInstallFailed { detail: String },
}

/// Errors from wrapper generation. The wrapper embeds absolute paths only,
/// so both inputs must exist and be absolute at generation time.
#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("entry point '{}' does not exist", .0.display())]
    EntryPointMissing(PathBuf),

    #[error("interpreter '{}' does not exist", .0.display())]
    InterpreterMissing(PathBuf),

    #[error("wrapper paths must be absolute, got '{}'", .0.display())]
    RelativePath(PathBuf),
}

/// Errors from publishing a wrapper into the shared command directory.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("command directory '{}' is not writable (permission denied)", .dir.display())]
    PermissionDenied { dir: PathBuf },

    #[error("failed to install command: {0}")]
    Io(#[from] std::io::Error),
}

/// Boundary error for a single tool's pipeline.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Wrapper(#[from] WrapperError),

    #[error(transparent)]
    Install(#[from] InstallError),
}
