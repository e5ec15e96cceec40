mod cli;
mod commands;
mod observability;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use toolbelt_core::ProvisionConfig;

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Install {
            root,
            bin_dir,
            env_dir,
            skip_resync,
            install_timeout,
            json,
        } => {
            let cfg = ProvisionConfig::from_env().with_cli_overrides(
                bin_dir,
                env_dir,
                install_timeout,
                skip_resync,
            );
            commands::install::cmd_install(root, cfg, json)?
        }
        Commands::List { root, json } => commands::list::cmd_list(root, json)?,
        Commands::Clean {
            root,
            bin_dir,
            env_dir,
            published,
            dry_run,
            force,
        } => {
            let cfg = ProvisionConfig::from_env().with_cli_overrides(bin_dir, env_dir, None, false);
            commands::clean::cmd_clean(root, cfg, published, dry_run, force)?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
