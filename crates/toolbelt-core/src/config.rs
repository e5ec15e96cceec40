//! Run configuration: paths, timeouts, and the resync policy.
//!
//! Loaded from `TOOLBELT_*` environment variables with CLI overrides applied
//! on top. All components take the config as an explicit handle; nothing
//! reads the environment after startup.

use std::path::PathBuf;

/// Default name of the per-tool environment directory (`<tool>/venv`).
pub const DEFAULT_ENV_DIR_NAME: &str = "venv";

/// Default liveness-probe timeout in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Default environment-creation timeout in seconds.
pub const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 300;

/// Default dependency-install timeout in seconds. Generous: a cold pip run
/// for a heavyweight manifest can legitimately take minutes.
pub const DEFAULT_INSTALL_TIMEOUT_SECS: u64 = 900;

#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Shared, PATH-visible directory command shims are published into.
    pub bin_dir: PathBuf,
    /// Name of the environment directory nested under each tool directory.
    pub env_dir_name: String,
    pub probe_timeout_secs: u64,
    pub create_timeout_secs: u64,
    pub install_timeout_secs: u64,
    /// When true, a healthy pre-existing environment is reused without
    /// resyncing dependencies. Off by default: manifests may have changed
    /// since the last install.
    pub skip_resync: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ProvisionConfig {
    /// Load configuration from `TOOLBELT_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            bin_dir: env_path("TOOLBELT_BIN_DIR").unwrap_or_else(default_bin_dir),
            env_dir_name: std::env::var("TOOLBELT_ENV_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENV_DIR_NAME.to_string()),
            probe_timeout_secs: env_u64("TOOLBELT_PROBE_TIMEOUT_SECS", DEFAULT_PROBE_TIMEOUT_SECS),
            create_timeout_secs: env_u64(
                "TOOLBELT_CREATE_TIMEOUT_SECS",
                DEFAULT_CREATE_TIMEOUT_SECS,
            ),
            install_timeout_secs: env_u64(
                "TOOLBELT_INSTALL_TIMEOUT_SECS",
                DEFAULT_INSTALL_TIMEOUT_SECS,
            ),
            skip_resync: env_bool("TOOLBELT_SKIP_RESYNC"),
        }
    }

    /// Override with CLI parameters.
    pub fn with_cli_overrides(
        mut self,
        bin_dir: Option<PathBuf>,
        env_dir_name: Option<String>,
        install_timeout: Option<u64>,
        skip_resync: bool,
    ) -> Self {
        if let Some(dir) = bin_dir {
            self.bin_dir = dir;
        }
        if let Some(name) = env_dir_name {
            self.env_dir_name = name;
        }
        if let Some(secs) = install_timeout {
            self.install_timeout_secs = secs;
        }
        if skip_resync {
            self.skip_resync = true;
        }
        self
    }
}

/// Default command directory: `~/.local/bin` on Linux (user-writable and
/// conventionally on PATH), falling back through the home directory.
pub fn default_bin_dir() -> PathBuf {
    dirs::executable_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("bin")))
        .unwrap_or_else(|| PathBuf::from(".").join("bin"))
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v == "1" || v == "true" || v == "yes"
        })
        .unwrap_or(false)
}
