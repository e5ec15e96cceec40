use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// toolbelt - provision self-contained CLI tools into isolated environments
#[derive(Parser, Debug)]
#[command(name = "toolbelt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover tools under ROOT and install each one: isolated environment,
    /// dependencies, and a command shim on PATH
    Install {
        /// Root directory containing tool directories
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// Directory to publish command shims into (default: ~/.local/bin)
        #[arg(long, value_name = "DIR", env = "TOOLBELT_BIN_DIR")]
        bin_dir: Option<PathBuf>,

        /// Name of the per-tool environment directory (default: venv)
        #[arg(long, value_name = "NAME", env = "TOOLBELT_ENV_DIR")]
        env_dir: Option<String>,

        /// Reuse a healthy environment without resyncing its dependencies
        #[arg(long, default_value = "false")]
        skip_resync: bool,

        /// Dependency install timeout in seconds (default: from env or 900)
        #[arg(long, value_name = "SECS")]
        install_timeout: Option<u64>,

        /// Print the run summary as JSON on stdout
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List tool directories discovered under ROOT without installing
    List {
        /// Root directory containing tool directories
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// Print discovered tools as JSON on stdout
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Remove per-tool environments (and optionally their published shims)
    Clean {
        /// Root directory containing tool directories
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// Directory the shims were published into (default: ~/.local/bin)
        #[arg(long, value_name = "DIR", env = "TOOLBELT_BIN_DIR")]
        bin_dir: Option<PathBuf>,

        /// Name of the per-tool environment directory (default: venv)
        #[arg(long, value_name = "NAME", env = "TOOLBELT_ENV_DIR")]
        env_dir: Option<String>,

        /// Also remove the tools' published shims from the bin directory
        #[arg(long, default_value = "false")]
        published: bool,

        /// Show what would be removed without removing anything
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(long, default_value = "false")]
        force: bool,
    },
}
