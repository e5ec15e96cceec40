//! Run coordination: drive the per-tool pipeline and aggregate outcomes.
//!
//! Tools are processed sequentially. Any error from the environment, sync,
//! wrapper, or publish steps is caught at the pipeline boundary, recorded
//! as a failed outcome, and the batch moves on: one broken tool never
//! aborts the run. Progress flows through the [`Reporter`] handle; the
//! coordinator itself never prints.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::config::ProvisionConfig;
use crate::discovery::ToolDescriptor;
use crate::envs::ensure_environment;
use crate::error::ToolError;
use crate::process::CommandRunner;
use crate::publish::publish_wrapper;
use crate::sync::sync_dependencies;
use crate::wrapper::generate_wrapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Installed,
    Failed,
}

/// Per-tool result, reporting only; nothing is persisted between runs.
#[derive(Debug, Clone, Serialize)]
pub struct InstallationOutcome {
    pub tool_name: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<InstallationOutcome>,
    pub installed: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub finished_at: String,
}

impl RunSummary {
    /// True only when every discovered tool was installed and the run was
    /// not cut short.
    pub fn success(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }
}

/// Progress sink, passed in explicitly so pipelines are testable without a
/// console.
pub trait Reporter {
    fn tool_started(&mut self, _tool: &ToolDescriptor) {}
    fn tool_installed(&mut self, _tool_name: &str, _command_path: &Path) {}
    fn tool_failed(&mut self, _tool_name: &str, _error: &ToolError) {}
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Run the full pipeline for one tool: environment → dependencies →
/// wrapper → publish. Returns the published command path.
pub fn provision_tool(
    tool: &ToolDescriptor,
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
) -> Result<PathBuf, ToolError> {
    let handle = ensure_environment(tool, cfg, runner)?;

    if handle.reused && cfg.skip_resync {
        tracing::info!(tool = %tool.name, "healthy environment reused, dependency resync skipped");
    } else {
        sync_dependencies(&handle, &tool.manifest_path, cfg, runner)?;
    }

    let artifact = generate_wrapper(&tool.name, &tool.entry_point_path, &handle.interpreter_path)?;
    let command = publish_wrapper(&artifact, &cfg.bin_dir)?;
    Ok(command)
}

/// Provision every tool in order, isolating per-tool failures. The cancel
/// flag is checked between tool pipelines: a cancelled run finishes the
/// current tool cleanly and reports what it completed.
pub fn provision_all(
    tools: &[ToolDescriptor],
    cfg: &ProvisionConfig,
    runner: &dyn CommandRunner,
    reporter: &mut dyn Reporter,
    cancel: &AtomicBool,
) -> RunSummary {
    let mut outcomes = Vec::with_capacity(tools.len());
    let mut cancelled = false;

    for tool in tools {
        if cancel.load(Ordering::SeqCst) {
            tracing::warn!(remaining = tools.len() - outcomes.len(), "run cancelled");
            cancelled = true;
            break;
        }

        reporter.tool_started(tool);
        match provision_tool(tool, cfg, runner) {
            Ok(command) => {
                reporter.tool_installed(&tool.name, &command);
                outcomes.push(InstallationOutcome {
                    tool_name: tool.name.clone(),
                    status: OutcomeStatus::Installed,
                    error_detail: None,
                });
            }
            Err(e) => {
                tracing::error!(tool = %tool.name, error = %e, "provisioning failed");
                reporter.tool_failed(&tool.name, &e);
                outcomes.push(InstallationOutcome {
                    tool_name: tool.name.clone(),
                    status: OutcomeStatus::Failed,
                    error_detail: Some(e.to_string()),
                });
            }
        }
    }

    let installed = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Installed)
        .count();
    let failed = outcomes.len() - installed;

    RunSummary {
        outcomes,
        installed,
        failed,
        cancelled,
        finished_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{discover_tools, ENTRY_POINT_FILE, MANIFEST_FILE};
    use crate::testing::{FakeResponse, FakeRunner};
    use std::fs;
    use std::sync::Arc;

    fn make_tool(root: &Path, name: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(ENTRY_POINT_FILE), "#!/usr/bin/env python3\n").unwrap();
        fs::write(dir.join(MANIFEST_FILE), "typer\n").unwrap();
    }

    fn cfg_for(bin_dir: &Path) -> ProvisionConfig {
        ProvisionConfig {
            bin_dir: bin_dir.to_path_buf(),
            env_dir_name: "venv".to_string(),
            probe_timeout_secs: 5,
            create_timeout_secs: 5,
            install_timeout_secs: 5,
            skip_resync: false,
        }
    }

    /// Fake venv creation: materialize `<env>/bin/python` at the path the
    /// invocation asked for.
    fn venv_runner() -> FakeRunner {
        FakeRunner::new().on_with("-m venv", FakeResponse::ok(), |inv| {
            let env = PathBuf::from(inv.args.last().unwrap());
            fs::create_dir_all(env.join("bin")).unwrap();
            fs::write(env.join("bin").join("python"), "").unwrap();
        })
    }

    #[test]
    fn installs_every_discovered_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        make_tool(tmp.path(), "aicap");
        make_tool(tmp.path(), "comfy");

        let tools = discover_tools(tmp.path()).unwrap();
        let runner = venv_runner();
        let cancel = AtomicBool::new(false);
        let summary = provision_all(
            &tools,
            &cfg_for(bin.path()),
            &runner,
            &mut NullReporter,
            &cancel,
        );

        assert!(summary.success());
        assert_eq!(summary.installed, 2);
        assert_eq!(summary.failed, 0);
        assert!(bin.path().join("aicap").is_file());
        assert!(bin.path().join("comfy").is_file());
    }

    #[test]
    fn one_broken_tool_does_not_abort_the_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        make_tool(tmp.path(), "alpha");
        make_tool(tmp.path(), "bravo");
        make_tool(tmp.path(), "charlie");

        let tools = discover_tools(tmp.path()).unwrap();
        // bravo's manifest install fails; everyone else provisions fine.
        let runner = FakeRunner::new()
            .on(
                "bravo/requirements.txt",
                FakeResponse::fail(1, "ERROR: resolution impossible"),
            )
            .on_with("-m venv", FakeResponse::ok(), |inv| {
                let env = PathBuf::from(inv.args.last().unwrap());
                fs::create_dir_all(env.join("bin")).unwrap();
                fs::write(env.join("bin").join("python"), "").unwrap();
            });

        let cancel = AtomicBool::new(false);
        let summary = provision_all(
            &tools,
            &cfg_for(bin.path()),
            &runner,
            &mut NullReporter,
            &cancel,
        );

        assert_eq!(summary.installed, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.success());

        let failed = summary
            .outcomes
            .iter()
            .find(|o| o.status == OutcomeStatus::Failed)
            .unwrap();
        assert_eq!(failed.tool_name, "bravo");
        assert!(failed
            .error_detail
            .as_deref()
            .unwrap()
            .contains("resolution impossible"));

        assert!(bin.path().join("alpha").is_file());
        assert!(bin.path().join("charlie").is_file());
        assert!(!bin.path().join("bravo").exists());
        // Failed environment is left on disk for inspection.
        assert!(tmp.path().join("bravo").join("venv").is_dir());
    }

    #[test]
    fn rerun_is_idempotent_and_resyncs_dependencies() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        make_tool(tmp.path(), "aicap");

        let tools = discover_tools(tmp.path()).unwrap();
        let runner = venv_runner();
        let cancel = AtomicBool::new(false);
        let cfg = cfg_for(bin.path());

        let first = provision_all(&tools, &cfg, &runner, &mut NullReporter, &cancel);
        let shim_bytes = fs::read(bin.path().join("aicap")).unwrap();
        let second = provision_all(&tools, &cfg, &runner, &mut NullReporter, &cancel);

        assert!(first.success() && second.success());
        assert_eq!(fs::read(bin.path().join("aicap")).unwrap(), shim_bytes);
        // Environment created once, dependencies synced on both runs.
        assert_eq!(runner.count_calls("-m venv"), 1);
        assert_eq!(runner.count_calls("-m pip install -r"), 2);
    }

    #[test]
    fn skip_resync_fast_path_skips_sync_only_for_reused_environments() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        make_tool(tmp.path(), "aicap");

        let tools = discover_tools(tmp.path()).unwrap();
        let runner = venv_runner();
        let cancel = AtomicBool::new(false);
        let cfg = ProvisionConfig {
            skip_resync: true,
            ..cfg_for(bin.path())
        };

        // First run creates the environment, so dependencies still install.
        provision_all(&tools, &cfg, &runner, &mut NullReporter, &cancel);
        assert_eq!(runner.count_calls("-m pip install -r"), 1);

        // Second run reuses it and takes the fast path.
        provision_all(&tools, &cfg, &runner, &mut NullReporter, &cancel);
        assert_eq!(runner.count_calls("-m pip install -r"), 1);
    }

    #[test]
    fn pre_set_cancel_flag_stops_before_any_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        make_tool(tmp.path(), "aicap");

        let tools = discover_tools(tmp.path()).unwrap();
        let runner = venv_runner();
        let cancel = AtomicBool::new(true);
        let summary = provision_all(
            &tools,
            &cfg_for(bin.path()),
            &runner,
            &mut NullReporter,
            &cancel,
        );

        assert!(summary.cancelled);
        assert!(summary.outcomes.is_empty());
        assert!(runner.calls().is_empty());
    }

    /// Reporter that requests cancellation after the first installed tool.
    struct CancelAfterFirst(Arc<AtomicBool>);

    impl Reporter for CancelAfterFirst {
        fn tool_installed(&mut self, _tool_name: &str, _command_path: &Path) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn cancellation_between_pipelines_finishes_current_tool_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        make_tool(tmp.path(), "alpha");
        make_tool(tmp.path(), "bravo");

        let tools = discover_tools(tmp.path()).unwrap();
        let runner = venv_runner();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut reporter = CancelAfterFirst(cancel.clone());

        let summary = provision_all(&tools, &cfg_for(bin.path()), &runner, &mut reporter, &cancel);

        assert!(summary.cancelled);
        assert_eq!(summary.installed, 1);
        assert!(bin.path().join("alpha").is_file());
        assert!(!bin.path().join("bravo").exists());
    }

    /// Reporter events arrive in pipeline order.
    #[derive(Default)]
    struct CountingReporter {
        started: usize,
        installed: usize,
        failed: usize,
    }

    impl Reporter for CountingReporter {
        fn tool_started(&mut self, _tool: &ToolDescriptor) {
            self.started += 1;
        }
        fn tool_installed(&mut self, _tool_name: &str, _command_path: &Path) {
            self.installed += 1;
        }
        fn tool_failed(&mut self, _tool_name: &str, _error: &ToolError) {
            self.failed += 1;
        }
    }

    #[test]
    fn reporter_sees_every_tool_exactly_once() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        make_tool(tmp.path(), "alpha");
        make_tool(tmp.path(), "bravo");

        let tools = discover_tools(tmp.path()).unwrap();
        let runner = FakeRunner::new()
            .on(
                "bravo/requirements.txt",
                FakeResponse::fail(1, "boom"),
            )
            .on_with("-m venv", FakeResponse::ok(), |inv| {
                let env = PathBuf::from(inv.args.last().unwrap());
                fs::create_dir_all(env.join("bin")).unwrap();
                fs::write(env.join("bin").join("python"), "").unwrap();
            });

        let cancel = AtomicBool::new(false);
        let mut reporter = CountingReporter::default();
        provision_all(&tools, &cfg_for(bin.path()), &runner, &mut reporter, &cancel);

        assert_eq!(reporter.started, 2);
        assert_eq!(reporter.installed, 1);
        assert_eq!(reporter.failed, 1);
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = RunSummary {
            outcomes: vec![InstallationOutcome {
                tool_name: "aicap".to_string(),
                status: OutcomeStatus::Installed,
                error_detail: None,
            }],
            installed: 1,
            failed: 0,
            cancelled: false,
            finished_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["installed"], 1);
        assert_eq!(json["outcomes"][0]["status"], "installed");
        assert!(json["outcomes"][0].get("error_detail").is_none());
    }
}
