//! Publishing: atomically install a wrapper into the shared command
//! directory.
//!
//! The shim is staged as a temp file in the target directory (same
//! filesystem, so the final rename is atomic) and only renamed over
//! `<bin_dir>/<name>` once fully written and marked executable. A crash
//! mid-publish leaves either the previous shim or nothing, never a
//! truncated command.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::wrapper::WrapperArtifact;

/// Run-level precondition: the command directory exists (created if needed)
/// and is writable. Detecting a permission problem here, before any
/// per-tool work, is what keeps a misconfigured run from half-provisioning.
pub fn check_bin_dir(bin_dir: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(bin_dir).map_err(|e| classify(e, bin_dir))?;
    let probe = tempfile::NamedTempFile::new_in(bin_dir).map_err(|e| classify(e, bin_dir))?;
    drop(probe);
    Ok(())
}

/// Atomically install `artifact` as `<bin_dir>/<target_name>`, replacing any
/// prior version. Returns the published path.
pub fn publish_wrapper(
    artifact: &WrapperArtifact,
    bin_dir: &Path,
) -> Result<PathBuf, InstallError> {
    let target = bin_dir.join(&artifact.target_name);

    let mut tmp = tempfile::NamedTempFile::new_in(bin_dir).map_err(|e| classify(e, bin_dir))?;
    tmp.write_all(artifact.contents.as_bytes())
        .map_err(InstallError::Io)?;

    // Executable before it becomes visible under the target name.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o755))
            .map_err(InstallError::Io)?;
    }

    tmp.persist(&target)
        .map_err(|e| classify(e.error, bin_dir))?;

    tracing::info!(command = %target.display(), "wrapper published");
    Ok(target)
}

/// Remove a previously published shim. Missing is fine (idempotent).
pub fn unpublish_wrapper(bin_dir: &Path, target_name: &str) -> Result<bool, InstallError> {
    let target = bin_dir.join(target_name);
    match fs::remove_file(&target) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(classify(e, bin_dir)),
    }
}

fn classify(e: std::io::Error, dir: &Path) -> InstallError {
    if e.kind() == ErrorKind::PermissionDenied {
        InstallError::PermissionDenied {
            dir: dir.to_path_buf(),
        }
    } else {
        InstallError::Io(e)
    }
}
