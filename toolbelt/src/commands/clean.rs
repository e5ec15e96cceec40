//! `toolbelt clean`: remove per-tool environments, and optionally the
//! published shims, for every tool discovered under a root.
//!
//! Environments live at `<tool>/<env-dir>`, one per tool. Removal is
//! confirmed interactively unless `--force`; `--dry-run` only reports.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use toolbelt_core::{discover_tools, publish, ProvisionConfig};

pub fn cmd_clean(
    root: PathBuf,
    cfg: ProvisionConfig,
    published: bool,
    dry_run: bool,
    force: bool,
) -> Result<i32> {
    let tools = discover_tools(&root)?;

    let mut envs: Vec<(String, PathBuf, u64)> = Vec::new();
    let mut total_size: u64 = 0;
    for tool in &tools {
        let env_path = tool.root_path.join(&cfg.env_dir_name);
        if env_path.is_dir() {
            let size = dir_size(&env_path);
            total_size += size;
            envs.push((tool.name.clone(), env_path, size));
        }
    }

    if envs.is_empty() && !published {
        eprintln!("No environments found under {}", root.display());
        return Ok(0);
    }

    eprintln!("🗂  {} environment(s) under {}:", envs.len(), root.display());
    eprintln!();
    for (name, path, size) in &envs {
        eprintln!("  • {} ({}) — {}", name, format_size(*size), path.display());
    }
    eprintln!();
    eprintln!("Total: {} ({} environments)", format_size(total_size), envs.len());
    if published {
        eprintln!(
            "Published shims in {} will also be removed.",
            cfg.bin_dir.display()
        );
    }

    if dry_run {
        eprintln!();
        eprintln!("(Dry run — nothing removed. Remove --dry-run to delete.)");
        return Ok(0);
    }

    if !force && !confirm("Remove all listed environments?")? {
        eprintln!("Cancelled.");
        return Ok(0);
    }

    let mut removed = 0;
    let mut errors = 0;
    for (name, path, _) in &envs {
        match fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => {
                eprintln!("  ✗ Failed to remove {}: {}", name, e);
                errors += 1;
            }
        }
    }

    let mut unpublished = 0;
    if published {
        for tool in &tools {
            match publish::unpublish_wrapper(&cfg.bin_dir, &tool.name) {
                Ok(true) => unpublished += 1,
                Ok(false) => {}
                Err(e) => {
                    eprintln!("  ✗ Failed to unpublish {}: {}", tool.name, e);
                    errors += 1;
                }
            }
        }
    }

    eprintln!();
    if errors == 0 {
        eprintln!(
            "✓ Removed {} environment(s), freed {}",
            removed,
            format_size(total_size)
        );
        if published {
            eprintln!("✓ Unpublished {} shim(s)", unpublished);
        }
        Ok(0)
    } else {
        eprintln!(
            "⚠ Removed {}/{} environments ({} errors)",
            removed,
            envs.len(),
            errors
        );
        Ok(1)
    }
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("\n{} [y/N] ", question);
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Total size of a directory tree in bytes.
fn dir_size(path: &Path) -> u64 {
    let mut total: u64 = 0;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                total += dir_size(&p);
            } else if let Ok(meta) = p.metadata() {
                total += meta.len();
            }
        }
    }
    total
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
