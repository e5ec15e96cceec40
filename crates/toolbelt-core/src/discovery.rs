//! Tool discovery: find tool directories under a root path.
//!
//! A subdirectory is a tool iff it contains both the recognized entry-point
//! file and the recognized dependency manifest. Everything else is silently
//! skipped. Results are sorted by directory name so repeated runs produce
//! stable logs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::DiscoveryError;

/// Recognized entry-point file name.
pub const ENTRY_POINT_FILE: &str = "main.py";

/// Recognized dependency-manifest file name.
pub const MANIFEST_FILE: &str = "requirements.txt";

/// A discovered tool directory. All paths are absolute; the published
/// command is named after the directory's base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub root_path: PathBuf,
    pub entry_point_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Discover tool directories among the immediate children of `root`.
///
/// Returns descriptors sorted by tool name. An empty result is not an error
/// here; the caller decides whether a no-op run is fatal.
pub fn discover_tools(root: &Path) -> Result<Vec<ToolDescriptor>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
    }
    let root = root
        .canonicalize()
        .map_err(|source| DiscoveryError::Unreadable {
            dir: root.to_path_buf(),
            source,
        })?;

    let entries = fs::read_dir(&root).map_err(|source| DiscoveryError::Unreadable {
        dir: root.clone(),
        source,
    })?;
    let mut children: Vec<_> = entries.flatten().collect();
    children.sort_by_key(|e| e.file_name());

    let mut tools = Vec::new();
    for entry in children {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let entry_point = path.join(ENTRY_POINT_FILE);
        let manifest = path.join(MANIFEST_FILE);
        if entry_point.is_file() && manifest.is_file() {
            tools.push(ToolDescriptor {
                name,
                root_path: path,
                entry_point_path: entry_point,
                manifest_path: manifest,
            });
        } else {
            tracing::debug!(dir = %path.display(), "not a tool directory, skipping");
        }
    }

    Ok(tools)
}
