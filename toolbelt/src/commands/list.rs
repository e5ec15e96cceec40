//! `toolbelt list`: show what discovery would provision, without touching
//! anything.

use std::path::PathBuf;

use anyhow::Result;
use toolbelt_core::discover_tools;

pub fn cmd_list(root: PathBuf, json: bool) -> Result<i32> {
    let tools = discover_tools(&root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(0);
    }

    if tools.is_empty() {
        eprintln!("No tools found under {}", root.display());
        return Ok(0);
    }

    eprintln!("🗂  {} tool(s) under {}:", tools.len(), root.display());
    eprintln!();
    for tool in &tools {
        eprintln!("  • {} ({})", tool.name, tool.root_path.display());
    }
    Ok(0)
}
