//! Wrapper generation: the executable shim published for each tool.
//!
//! The shim is an indirection script: it execs the tool's isolated
//! interpreter with the tool's entry point, forwarding arguments and stdio
//! untouched and exiting with the child's exit code. The tool's own source
//! is never modified. Generation is a pure function of
//! `{tool name, entry point, interpreter}`, so regenerating is idempotent.

use std::path::{Path, PathBuf};

use crate::error::WrapperError;

/// A generated-but-not-yet-published command shim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperArtifact {
    /// File name the shim is published under (the tool directory's base name).
    pub target_name: String,
    pub interpreter_path: PathBuf,
    pub entry_point_path: PathBuf,
    pub contents: String,
}

/// Generate the shim for one tool.
///
/// Both paths must be absolute (the shim is invoked from arbitrary working
/// directories later) and must exist now, so a vanished entry point is
/// caught at provision time rather than first invocation.
pub fn generate_wrapper(
    tool_name: &str,
    entry_point: &Path,
    interpreter: &Path,
) -> Result<WrapperArtifact, WrapperError> {
    for path in [entry_point, interpreter] {
        if path.is_relative() {
            return Err(WrapperError::RelativePath(path.to_path_buf()));
        }
    }
    if !interpreter.is_file() {
        return Err(WrapperError::InterpreterMissing(interpreter.to_path_buf()));
    }
    if !entry_point.is_file() {
        return Err(WrapperError::EntryPointMissing(entry_point.to_path_buf()));
    }

    let contents = format!(
        "#!/bin/sh\n# {tool_name}: generated by toolbelt, do not edit.\nexec {} {} \"$@\"\n",
        sh_quote(interpreter),
        sh_quote(entry_point),
    );

    Ok(WrapperArtifact {
        target_name: tool_name.to_string(),
        interpreter_path: interpreter.to_path_buf(),
        entry_point_path: entry_point.to_path_buf(),
        contents,
    })
}

/// Single-quote for POSIX sh: every byte survives except `'`, which becomes
/// the `'\''` dance. Keeps whitespace-bearing paths intact.
fn sh_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}
