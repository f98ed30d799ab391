//! CLI command definitions and handlers

mod init;
mod profiles;
mod scan;

use agent_ready::i18n::Language;
use agent_ready::models::Level;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// agent-ready - repository maturity scanner for AI coding agents
#[derive(Parser, Debug)]
#[command(name = "agent-ready")]
#[command(
    version,
    about = "Score a repository L1-L5 across nine readiness pillars",
    long_about = "agent-ready evaluates a repository against a versioned rubric of \
file, workflow, build and dependency checks, then reports the maturity level \
reached in each pillar (docs, style, build, test, security, observability, env, \
task discovery, product) and a prioritized roadmap of what to fix next.",
    after_help = "\
Examples:
  agent-ready scan .                          Scan the current directory
  agent-ready scan . --format json            JSON report for scripting
  agent-ready scan . --level L2               Exit code 1 below L2 (CI mode)
  agent-ready scan . --language zh -f md      Chinese Markdown report
  agent-ready profiles --show factory_compat  Print a rubric as JSON"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: one per core)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a repository and report its maturity level
    Scan {
        /// Path to repository
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Rubric profile to evaluate
        #[arg(long, short = 'p')]
        profile: Option<String>,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output_file: Option<PathBuf>,

        /// Report language: en, zh
        #[arg(long, short = 'l')]
        language: Option<Language>,

        /// Exit with code 1 if the repository is below this level
        #[arg(long)]
        level: Option<Level>,

        /// Show every check, not only pillar summaries
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// List available profiles or print one
    Profiles {
        /// Print this profile as JSON
        #[arg(long)]
        show: Option<String>,

        /// Repository whose agent-ready.toml adds profile directories
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Write an example agent-ready.toml
    Init {
        /// Path to repository
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan {
            path,
            profile,
            format,
            output_file,
            language,
            level,
            verbose,
        } => scan::run(scan::ScanArgs {
            path,
            profile,
            format,
            output_file,
            language,
            target_level: level,
            verbose,
            workers: cli.workers,
        }),

        Commands::Profiles { show, path } => profiles::run(&path, show.as_deref()),

        Commands::Init { path, force } => init::run(&path, force),
    }
}
