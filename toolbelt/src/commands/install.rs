//! `toolbelt install`: the end-to-end provisioning run.
//!
//! Run-level preconditions (root exists, at least one tool, bin dir
//! writable) abort the whole run; everything after that is per-tool and
//! isolated by the coordinator.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use anyhow::Result;
use toolbelt_core::{
    discover_tools, provision_all, publish, DiscoveryError, InstallError, OutcomeStatus,
    ProvisionConfig, Reporter, RunSummary, SystemRunner, ToolDescriptor, ToolError,
};

/// Per-tool progress on stderr.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn tool_started(&mut self, tool: &ToolDescriptor) {
        eprintln!("• {} — provisioning", tool.name);
    }

    fn tool_installed(&mut self, tool_name: &str, command_path: &Path) {
        eprintln!("  ✓ {} → {}", tool_name, command_path.display());
    }

    fn tool_failed(&mut self, tool_name: &str, error: &ToolError) {
        eprintln!("  ✗ {}: {}", tool_name, error);
    }
}

pub fn cmd_install(root: PathBuf, cfg: ProvisionConfig, json: bool) -> Result<i32> {
    let tools = discover_tools(&root)?;
    if tools.is_empty() {
        return Err(DiscoveryError::NoToolsFound(root).into());
    }
    eprintln!("Found {} tool(s) under {}", tools.len(), root.display());

    // The most common operator-facing failure: surface it before any
    // per-tool work has touched the filesystem.
    if let Err(e) = publish::check_bin_dir(&cfg.bin_dir) {
        let msg = match &e {
            InstallError::PermissionDenied { .. } => format!(
                "cannot publish into '{}' — choose a writable --bin-dir or rerun with sufficient privileges",
                cfg.bin_dir.display()
            ),
            _ => format!("cannot prepare command directory '{}'", cfg.bin_dir.display()),
        };
        return Err(anyhow::Error::new(e).context(msg));
    }

    let cancel = AtomicBool::new(false);
    let summary = provision_all(&tools, &cfg, &SystemRunner, &mut ConsoleReporter, &cancel);
    tracing::debug!(
        installed = summary.installed,
        failed = summary.failed,
        "provisioning run complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(exit_code(&summary))
}

fn print_summary(summary: &RunSummary) {
    eprintln!();
    if summary.success() {
        eprintln!("✓ Installed {} tool(s)", summary.installed);
        return;
    }

    eprintln!(
        "⚠ Installed {}/{} tool(s), {} failure(s):",
        summary.installed,
        summary.outcomes.len(),
        summary.failed
    );
    for outcome in &summary.outcomes {
        if outcome.status == OutcomeStatus::Failed {
            eprintln!(
                "  ✗ {} — {}",
                outcome.tool_name,
                outcome.error_detail.as_deref().unwrap_or("unknown error")
            );
        }
    }
    if summary.cancelled {
        eprintln!("  (run cancelled before all tools were processed)");
    }
}

/// Exit 0 only when every discovered tool installed; partial success is
/// still a non-zero exit.
fn exit_code(summary: &RunSummary) -> i32 {
    if summary.success() {
        0
    } else {
        1
    }
}
