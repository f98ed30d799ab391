//! Init command - write an example project config

use agent_ready::config::PROJECT_CONFIG_FILE;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const EXAMPLE_CONFIG: &str = r#"# agent-ready configuration

[scan]
# Rubric profile to evaluate
# profile = "factory_compat"

# Report language: en, zh
# language = "en"

# Worker threads (default: one per core)
# workers = 8

[exclude]
# Glob patterns skipped on top of the built-in ones
# (node_modules, vendor, dist, build, ...)
paths = []

# Set to true to disable the built-in patterns
skip_defaults = false

[profiles]
# Directories searched for <name>.yaml before the built-in profiles
dirs = []
"#;

/// Run the init command
pub(super) fn run(path: &Path, force: bool) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !repo_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", repo_path.display());
    }

    let config_path = repo_path.join(PROJECT_CONFIG_FILE);
    if config_path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("\nNext: {}", style("agent-ready scan .").bold());
    Ok(())
}
